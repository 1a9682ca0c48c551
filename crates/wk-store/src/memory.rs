//! In-memory storage implementation.
//!
//! Provides [`MemoryStorage`], a process-local backend. Revision inserts are
//! serialized per page; different pages never contend with each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::history::History;
use crate::model::{Page, PageId, Revision};
use crate::storage::{Storage, StorageError};

/// Backend identifier for error messages.
const BACKEND: &str = "Memory";

/// A page and its revisions in ascending version order.
#[derive(Debug)]
struct PageSlot {
    page: Page,
    revisions: Mutex<Vec<Revision>>,
}

/// In-memory storage.
///
/// Lock order is `titles` before `pages`; revision lists are locked only after
/// the map lock has been released.
///
/// # Example
///
/// ```
/// use wk_store::{MemoryStorage, Storage};
///
/// let storage = MemoryStorage::new();
/// let page = storage.create_page("StartPage").unwrap();
/// assert_eq!(storage.find_page("StartPage").unwrap(), Some(page));
/// assert!(storage.find_page("startpage").unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    titles: RwLock<HashMap<String, PageId>>,
    pages: RwLock<HashMap<PageId, Arc<PageSlot>>>,
}

impl MemoryStorage {
    /// Create a new empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: &PageId) -> Result<Option<Arc<PageSlot>>, StorageError> {
        let pages = self.pages.read().map_err(|_| poisoned())?;
        Ok(pages.get(id).map(Arc::clone))
    }
}

fn poisoned() -> StorageError {
    StorageError::poisoned().with_backend(BACKEND)
}

impl Storage for MemoryStorage {
    fn find_page(&self, title: &str) -> Result<Option<Page>, StorageError> {
        let titles = self.titles.read().map_err(|_| poisoned())?;
        let Some(id) = titles.get(title) else {
            return Ok(None);
        };
        let pages = self.pages.read().map_err(|_| poisoned())?;
        Ok(pages.get(id).map(|slot| slot.page.clone()))
    }

    fn create_page(&self, title: &str) -> Result<Page, StorageError> {
        let mut titles = self.titles.write().map_err(|_| poisoned())?;
        if titles.contains_key(title) {
            return Err(StorageError::conflict().with_backend(BACKEND));
        }

        let page = Page {
            id: PageId::new(Uuid::new_v4().to_string()),
            title: title.to_owned(),
            created_at: Utc::now(),
        };
        let slot = Arc::new(PageSlot {
            page: page.clone(),
            revisions: Mutex::new(Vec::new()),
        });

        self.pages
            .write()
            .map_err(|_| poisoned())?
            .insert(page.id.clone(), slot);
        titles.insert(title.to_owned(), page.id.clone());
        Ok(page)
    }

    fn pages(&self) -> Result<Vec<Page>, StorageError> {
        let pages = self.pages.read().map_err(|_| poisoned())?;
        Ok(pages.values().map(|slot| slot.page.clone()).collect())
    }

    fn latest_revision(&self, page: &PageId) -> Result<Option<Revision>, StorageError> {
        let Some(slot) = self.slot(page)? else {
            return Ok(None);
        };
        let revisions = slot.revisions.lock().map_err(|_| poisoned())?;
        Ok(revisions.last().cloned())
    }

    fn insert_revision(&self, revision: &Revision) -> Result<(), StorageError> {
        let slot = self.slot(&revision.page)?.ok_or_else(|| {
            StorageError::not_found(revision.page.as_str()).with_backend(BACKEND)
        })?;

        let mut revisions = slot.revisions.lock().map_err(|_| poisoned())?;
        let head = revisions.last().map_or(0, |r| r.version);
        if revision.version != head + 1 {
            return Err(StorageError::conflict().with_backend(BACKEND));
        }
        revisions.push(revision.clone());
        Ok(())
    }

    fn revisions(&self, page: &PageId) -> Result<History, StorageError> {
        let Some(slot) = self.slot(page)? else {
            return Ok(History::empty());
        };
        let snapshot: Vec<Revision> = slot.revisions.lock().map_err(|_| poisoned())?.clone();
        Ok(History::new(snapshot.into_iter().rev().map(Ok)))
    }
}
