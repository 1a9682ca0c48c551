//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`], which keeps each page as a directory of JSON
//! documents:
//!
//! ```text
//! <data_dir>/
//!   pages/<hex(title)>/page.json
//!   pages/<hex(title)>/revisions/00000000000000000001.json
//!   tmp/
//! ```
//!
//! Writes are staged in `tmp/` and published atomically: pages by renaming a
//! fully populated directory into place, revisions by hard-linking a fully
//! written file to its version-numbered name. Both fail if the target already
//! exists, which is what makes the [`Storage`] writes conditional across
//! processes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::history::History;
use crate::model::{Page, PageId, Revision};
use crate::storage::{ErrorStatus, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Page record filename inside a page directory.
const PAGE_FILE: &str = "page.json";

/// Revision subdirectory inside a page directory.
const REVISIONS_DIR: &str = "revisions";

/// Longest encoded directory name; most filesystems cap names at 255 bytes.
const MAX_ENCODED_LEN: usize = 240;

/// Filesystem storage.
///
/// Page identities are the hex encoding of the title, so lookups by title
/// never need an index and any byte sequence is a valid title as long as its
/// encoding fits in a directory name.
///
/// # Example
///
/// ```no_run
/// use std::path::PathBuf;
/// use wk_store::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from(".wk/data"));
/// let page = storage.find_page("StartPage")?;
/// # Ok::<(), wk_store::StorageError>(())
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Root directory for all stored data.
    data_dir: PathBuf,
}

impl FsStorage {
    /// Create a filesystem storage rooted at `data_dir`.
    ///
    /// Directories are created lazily on the first write.
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn pages_dir(&self) -> PathBuf {
        self.data_dir.join("pages")
    }

    fn tmp_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }

    fn page_dir(&self, id: &PageId) -> PathBuf {
        self.pages_dir().join(id.as_str())
    }

    fn revisions_dir(&self, id: &PageId) -> PathBuf {
        self.page_dir(id).join(REVISIONS_DIR)
    }

    /// Map a title to its page identity.
    fn page_id(title: &str) -> Result<PageId, StorageError> {
        let encoded = hex::encode(title.as_bytes());
        if encoded.len() > MAX_ENCODED_LEN {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(title)
                .with_backend(BACKEND));
        }
        Ok(PageId::new(encoded))
    }

    /// Create a unique staging path under `tmp/`.
    fn staging_path(&self) -> Result<PathBuf, StorageError> {
        let tmp = self.tmp_dir();
        fs::create_dir_all(&tmp).map_err(|e| io_error(e, &tmp))?;
        Ok(tmp.join(Uuid::new_v4().to_string()))
    }

    /// Version numbers present for a page, unsorted.
    fn versions(&self, id: &PageId) -> Result<Vec<u64>, StorageError> {
        let dir = self.revisions_dir(id);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(e, &dir)),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(e, &dir))?;
            let name = entry.file_name();
            let Some(version) = name.to_str().and_then(parse_revision_filename) else {
                continue;
            };
            versions.push(version);
        }
        Ok(versions)
    }
}

/// Filename for a revision, zero-padded so lexical order matches version order.
fn revision_filename(version: u64) -> String {
    format!("{version:020}.json")
}

fn parse_revision_filename(name: &str) -> Option<u64> {
    name.strip_suffix(".json")?.parse().ok()
}

fn io_error(err: io::Error, path: &Path) -> StorageError {
    StorageError::io(err, Some(path.to_path_buf())).with_backend(BACKEND)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read(path).map_err(|e| io_error(e, path))?;
    serde_json::from_slice(&content).map_err(|e| {
        StorageError::new(StorageErrorKind::Corrupted)
            .with_path(path)
            .with_backend(BACKEND)
            .with_source(e)
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| {
        StorageError::new(StorageErrorKind::Other)
            .with_path(path)
            .with_backend(BACKEND)
            .with_source(e)
    })?;
    let mut file = fs::File::create_new(path).map_err(|e| io_error(e, path))?;
    file.write_all(&json).map_err(|e| io_error(e, path))?;
    file.sync_all().map_err(|e| io_error(e, path))
}

fn read_revision(dir: &Path, version: u64) -> Result<Revision, StorageError> {
    read_json(&dir.join(revision_filename(version)))
}

impl Storage for FsStorage {
    fn find_page(&self, title: &str) -> Result<Option<Page>, StorageError> {
        let path = self.page_dir(&Self::page_id(title)?).join(PAGE_FILE);
        match read_json(&path) {
            Ok(page) => Ok(Some(page)),
            Err(e) if e.kind == StorageErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn create_page(&self, title: &str) -> Result<Page, StorageError> {
        let id = Self::page_id(title)?;
        let target = self.page_dir(&id);
        if target.join(PAGE_FILE).exists() {
            return Err(StorageError::conflict().with_path(target).with_backend(BACKEND));
        }

        let page = Page {
            id,
            title: title.to_owned(),
            created_at: Utc::now(),
        };

        let staging = self.staging_path()?;
        let staged_revisions = staging.join(REVISIONS_DIR);
        fs::create_dir_all(&staged_revisions).map_err(|e| io_error(e, &staged_revisions))?;
        write_json(&staging.join(PAGE_FILE), &page)?;

        let pages_dir = self.pages_dir();
        fs::create_dir_all(&pages_dir).map_err(|e| io_error(e, &pages_dir))?;

        // Renaming onto an existing non-empty directory fails, so only one
        // concurrent creator can publish the page.
        let published = fs::rename(&staging, &target);
        if let Err(e) = published {
            let _ = fs::remove_dir_all(&staging);
            if target.join(PAGE_FILE).exists() {
                tracing::debug!(title = %title, "Lost page creation race");
                return Err(StorageError::conflict().with_path(target).with_backend(BACKEND));
            }
            return Err(io_error(e, &target));
        }

        tracing::debug!(title = %title, id = %page.id, "Created page directory");
        Ok(page)
    }

    fn pages(&self) -> Result<Vec<Page>, StorageError> {
        let dir = self.pages_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(e, &dir)),
        };

        let mut pages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(e, &dir))?;
            let path = entry.path().join(PAGE_FILE);
            match read_json::<Page>(&path) {
                Ok(page) => pages.push(page),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable page");
                }
            }
        }
        Ok(pages)
    }

    fn latest_revision(&self, page: &PageId) -> Result<Option<Revision>, StorageError> {
        let Some(head) = self.versions(page)?.into_iter().max() else {
            return Ok(None);
        };
        read_revision(&self.revisions_dir(page), head).map(Some)
    }

    fn insert_revision(&self, revision: &Revision) -> Result<(), StorageError> {
        let page_dir = self.page_dir(&revision.page);
        if !page_dir.join(PAGE_FILE).exists() {
            return Err(StorageError::not_found(page_dir).with_backend(BACKEND));
        }

        let head = self.versions(&revision.page)?.into_iter().max().unwrap_or(0);
        if revision.version != head + 1 {
            return Err(StorageError::conflict().with_backend(BACKEND));
        }

        let staging = self.staging_path()?;
        write_json(&staging, revision)?;

        // hard_link refuses to overwrite, so at most one writer claims a version.
        let target = self
            .revisions_dir(&revision.page)
            .join(revision_filename(revision.version));
        let linked = fs::hard_link(&staging, &target);
        let _ = fs::remove_file(&staging);

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(StorageError::conflict()
                .with_path(target)
                .with_backend(BACKEND)),
            Err(e) => Err(io_error(e, &target).with_status(ErrorStatus::Persistent)),
        }
    }

    fn revisions(&self, page: &PageId) -> Result<History, StorageError> {
        let mut versions = self.versions(page)?;
        versions.sort_unstable_by(|a, b| b.cmp(a));

        let dir = self.revisions_dir(page);
        Ok(History::new(
            versions
                .into_iter()
                .map(move |version| read_revision(&dir, version)),
        ))
    }
}
