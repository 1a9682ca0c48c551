//! Title to page identity mapping.

use std::sync::Arc;

use wk_store::{Page, Storage, StorageError, StorageErrorKind};

use crate::error::WikiError;

/// Maps unique page titles to [`Page`] identities.
///
/// Titles are matched byte for byte: no trimming, no case folding, no Unicode
/// normalization.
pub struct ContentRegistry {
    storage: Arc<dyn Storage>,
}

impl ContentRegistry {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Look up the page with exactly this title.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::MalformedInput`] if the backend cannot store this
    /// title, or [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn find_by_title(&self, title: &str) -> Result<Option<Page>, WikiError> {
        self.storage
            .find_page(title)
            .map_err(|e| WikiError::from_storage(title, e))
    }

    /// Return the page with this title, creating it if needed.
    ///
    /// Concurrent callers for the same title all receive the same page: the
    /// backend's create is conditional, and a caller that loses the race
    /// reads back the winner's page.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::MalformedInput`] if the backend cannot store this
    /// title, or [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn get_or_create(&self, title: &str) -> Result<Page, WikiError> {
        if let Some(page) = self.find_by_title(title)? {
            return Ok(page);
        }

        match self.storage.create_page(title) {
            Ok(page) => {
                tracing::info!(title = %title, page_id = %page.id, "Created page");
                Ok(page)
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(title = %title, "Page created concurrently, reading winner");
                self.find_by_title(title)?.ok_or_else(|| {
                    // Created and then gone: backends never delete pages.
                    WikiError::from(
                        StorageError::new(StorageErrorKind::Corrupted).with_path(title),
                    )
                })
            }
            Err(e) => Err(WikiError::from_storage(title, e)),
        }
    }

    /// All known pages, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn pages(&self) -> Result<Vec<Page>, WikiError> {
        Ok(self.storage.pages()?)
    }
}
