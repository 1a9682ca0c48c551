//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for keyed page and revision persistence,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Conditional writes
//!
//! Both write primitives are conditional so that callers can build atomic
//! get-or-create and append-next-version on top of them without locks:
//!
//! - [`Storage::create_page`] fails with [`StorageErrorKind::AlreadyExists`] if
//!   the title is taken.
//! - [`Storage::insert_revision`] fails with [`StorageErrorKind::AlreadyExists`]
//!   unless the revision's version is exactly the page's head version + 1.

use std::path::PathBuf;

use crate::history::History;
use crate::model::{Page, PageId, Revision};

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Resource already exists, or a conditional write lost a race.
    AlreadyExists,
    /// Title or identifier cannot be mapped to the backend.
    InvalidPath,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Stored data could not be decoded.
    Corrupted,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (invalid title, corrupted data, not found).
    #[default]
    Permanent,
    /// Retry immediately (lost a conditional write, timeout).
    Temporary,
    /// Retry with backoff (backend unavailable).
    Persistent,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Memory").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create the error a conditional write returns when it loses.
    #[must_use]
    pub fn conflict() -> Self {
        Self::new(StorageErrorKind::AlreadyExists).with_status(ErrorStatus::Temporary)
    }

    /// Create the error for a poisoned in-process lock.
    #[must_use]
    pub fn poisoned() -> Self {
        Self::new(StorageErrorKind::Unavailable).with_status(ErrorStatus::Persistent)
    }

    /// Whether this error reports a lost conditional write.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.kind == StorageErrorKind::AlreadyExists
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::AlreadyExists => StorageErrorKind::AlreadyExists,
            std::io::ErrorKind::InvalidFilename => StorageErrorKind::InvalidPath,
            std::io::ErrorKind::PermissionDenied
            | std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::StorageFull
            | std::io::ErrorKind::ReadOnlyFilesystem => StorageErrorKind::Unavailable,
            _ => StorageErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::AlreadyExists => {
                ErrorStatus::Temporary
            }
            std::io::ErrorKind::StorageFull => ErrorStatus::Persistent,
            _ => ErrorStatus::Permanent,
        };
        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::AlreadyExists => "Already exists",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Unavailable => "Unavailable",
            StorageErrorKind::Corrupted => "Corrupted",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Keyed storage for pages and their revisions.
///
/// Every method may block on I/O. Implementations must be safe to call from
/// many threads at once; the conditional writes are the only synchronization
/// callers rely on.
pub trait Storage: Send + Sync {
    /// Look up a page by exact title.
    ///
    /// Returns `Ok(None)` if no page has this title.
    fn find_page(&self, title: &str) -> Result<Option<Page>, StorageError>;

    /// Create a page for a previously unknown title.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::AlreadyExists`] if a page with this title
    /// exists (including one created concurrently).
    fn create_page(&self, title: &str) -> Result<Page, StorageError>;

    /// List all pages. Order is unspecified.
    fn pages(&self) -> Result<Vec<Page>, StorageError>;

    /// Revision with the highest version for a page.
    ///
    /// Returns `Ok(None)` for a page without revisions or an unknown page.
    fn latest_revision(&self, page: &PageId) -> Result<Option<Revision>, StorageError>;

    /// Persist a new revision.
    ///
    /// # Errors
    ///
    /// - [`StorageErrorKind::AlreadyExists`] if `revision.version` is not the
    ///   page's current head version + 1 (another writer got there first).
    /// - [`StorageErrorKind::NotFound`] if the page does not exist.
    fn insert_revision(&self, revision: &Revision) -> Result<(), StorageError>;

    /// All revisions for a page, newest first.
    ///
    /// Unknown pages yield an empty history.
    fn revisions(&self, page: &PageId) -> Result<History, StorageError>;
}
