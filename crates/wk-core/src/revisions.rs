//! Ordered, append-only revisions per page.

use std::sync::Arc;

use chrono::Utc;
use wk_store::{AuthorRef, History, Page, PageId, Revision, Storage};

use crate::error::WikiError;

/// Default number of insert attempts before giving up on a contended page.
pub const DEFAULT_MAX_APPEND_ATTEMPTS: u32 = 8;

/// Appends and retrieves revisions.
///
/// Version numbers are assigned by optimistic concurrency: an append reads the
/// head, proposes `head + 1`, and asks the backend to insert it only if that
/// version is still the next one. A writer that loses re-reads and tries
/// again, up to the configured number of attempts.
pub struct RevisionStore {
    storage: Arc<dyn Storage>,
    max_append_attempts: u32,
}

impl RevisionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            max_append_attempts: DEFAULT_MAX_APPEND_ATTEMPTS,
        }
    }

    /// Set the retry budget for contended appends (at least one attempt).
    #[must_use]
    pub fn with_max_append_attempts(mut self, attempts: u32) -> Self {
        self.max_append_attempts = attempts.max(1);
        self
    }

    /// Highest-versioned revision of the page, if any.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn latest(&self, page: &PageId) -> Result<Option<Revision>, WikiError> {
        Ok(self.storage.latest_revision(page)?)
    }

    /// Append a new revision with the next version number.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::VersionConflict`] if every attempt lost to a
    /// concurrent writer, [`WikiError::NotFound`] if the backend does not know
    /// the page, or [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn append(&self, page: &Page, body: &str, author: &AuthorRef) -> Result<Revision, WikiError> {
        for attempt in 1..=self.max_append_attempts {
            let next = self
                .storage
                .latest_revision(&page.id)
                .map_err(|e| WikiError::from_storage(&page.title, e))?
                .map_or(1, |head| head.version + 1);
            let revision = Revision::new(page.id.clone(), next, body, author.clone(), Utc::now());

            match self.storage.insert_revision(&revision) {
                Ok(()) => {
                    tracing::info!(
                        title = %page.title,
                        version = revision.version,
                        author = %author.id,
                        "Appended revision"
                    );
                    return Ok(revision);
                }
                Err(e) if e.is_conflict() => {
                    tracing::debug!(
                        title = %page.title,
                        version = next,
                        attempt,
                        "Lost version race, retrying"
                    );
                }
                Err(e) => return Err(WikiError::from_storage(&page.title, e)),
            }
        }

        tracing::warn!(
            title = %page.title,
            attempts = self.max_append_attempts,
            "Giving up on contended page"
        );
        Err(WikiError::VersionConflict {
            title: page.title.clone(),
            attempts: self.max_append_attempts,
        })
    }

    /// Revisions of the page, newest first.
    ///
    /// Each call takes a fresh view of the page; an unknown page yields an
    /// empty history.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn history(&self, page: &PageId) -> Result<History, WikiError> {
        Ok(self.storage.revisions(page)?)
    }
}
