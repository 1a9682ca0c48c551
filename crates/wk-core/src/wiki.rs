//! Page operations exposed to callers.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use wk_renderer::{DEFAULT_LINK_PREFIX, RenderPipeline, RenderedBody};
use wk_store::{AuthorRef, History, Page, Revision, Storage};

use crate::error::WikiError;
use crate::registry::ContentRegistry;
use crate::revisions::{DEFAULT_MAX_APPEND_ATTEMPTS, RevisionStore};

/// Default title of the page the wiki root leads to.
pub const DEFAULT_FRONT_PAGE: &str = "StartPage";

/// Wiki behavior settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WikiConfig {
    /// Title the wiki root redirects to.
    pub front_page: String,
    /// Path prefix of page references in rendered bodies.
    pub link_prefix: String,
    /// Insert attempts per save before reporting a version conflict.
    pub max_append_attempts: u32,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            front_page: DEFAULT_FRONT_PAGE.to_owned(),
            link_prefix: DEFAULT_LINK_PREFIX.to_owned(),
            max_append_attempts: DEFAULT_MAX_APPEND_ATTEMPTS,
        }
    }
}

/// A page together with its current revision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedPage {
    pub page: Page,
    /// `None` for a page that exists but has no revisions yet.
    pub latest: Option<Revision>,
}

/// Attribution line for a displayed revision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RevisionSummary {
    pub version: u64,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Revision> for RevisionSummary {
    fn from(revision: &Revision) -> Self {
        Self {
            version: revision.version,
            author_name: revision.author.name.clone(),
            created_at: revision.created_at,
        }
    }
}

impl fmt::Display for RevisionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version {} by {} on {}",
            self.version,
            self.author_name,
            self.created_at.format("%Y-%m-%d %H:%M UTC")
        )
    }
}

/// Revision-tracked wiki over a [`Storage`] backend.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wk_core::{Wiki, WikiConfig};
/// use wk_store::{AuthorRef, MemoryStorage};
///
/// let wiki = Wiki::new(Arc::new(MemoryStorage::new()), WikiConfig::default());
/// let ada = AuthorRef::new("ada", "Ada", "ada@example.com");
///
/// let revision = wiki.save_page("StartPage", "Hello WikiWord", &ada).unwrap();
/// let body = wiki.rendered_body(&revision);
/// assert_eq!(body.html, r#"<p>Hello <a href="/view/WikiWord">WikiWord</a></p>"#);
/// ```
pub struct Wiki {
    registry: ContentRegistry,
    revisions: RevisionStore,
    pipeline: RenderPipeline,
    front_page: String,
}

impl Wiki {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: WikiConfig) -> Self {
        Self {
            registry: ContentRegistry::new(Arc::clone(&storage)),
            revisions: RevisionStore::new(storage)
                .with_max_append_attempts(config.max_append_attempts),
            pipeline: RenderPipeline::new(config.link_prefix),
            front_page: config.front_page,
        }
    }

    /// Title of the page the wiki root leads to.
    #[must_use]
    pub fn front_page(&self) -> &str {
        &self.front_page
    }

    /// Look up a page and its current revision.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::NotFound`] if no page has this title, or
    /// [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn resolve_page(&self, title: &str) -> Result<ResolvedPage, WikiError> {
        let page = self
            .registry
            .find_by_title(title)?
            .ok_or_else(|| WikiError::not_found(title))?;
        let latest = self.revisions.latest(&page.id)?;
        Ok(ResolvedPage { page, latest })
    }

    /// Save a new revision of a page, creating the page on first save.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::MalformedInput`] for an empty title, one with
    /// control characters or one the backend cannot store,
    /// [`WikiError::VersionConflict`] if concurrent writers exhausted the
    /// retry budget, or [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn save_page(
        &self,
        title: &str,
        body: &str,
        author: &AuthorRef,
    ) -> Result<Revision, WikiError> {
        validate_title(title)?;
        let page = self.registry.get_or_create(title)?;
        self.revisions.append(&page, body, author)
    }

    /// Render a revision's body for display.
    #[must_use]
    pub fn rendered_body(&self, revision: &Revision) -> RenderedBody {
        self.pipeline.render(&revision.body)
    }

    /// Revisions of a page, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::NotFound`] if no page has this title, or
    /// [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn page_history(&self, title: &str) -> Result<History, WikiError> {
        let page = self
            .registry
            .find_by_title(title)?
            .ok_or_else(|| WikiError::not_found(title))?;
        self.revisions.history(&page.id)
    }

    /// Body to prefill an editor with: the current body, or empty for a page
    /// that does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::StorageUnavailable`] if the backend fails.
    pub fn edit_draft(&self, title: &str) -> Result<String, WikiError> {
        let Some(page) = self.registry.find_by_title(title)? else {
            return Ok(String::new());
        };
        Ok(self
            .revisions
            .latest(&page.id)?
            .map(|revision| revision.body)
            .unwrap_or_default())
    }

    /// Titles of every page the author has revised at least once.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::StorageUnavailable`] if the backend fails or a
    /// stored revision cannot be read.
    pub fn contributions(&self, author_id: &str) -> Result<BTreeSet<String>, WikiError> {
        let mut titles = BTreeSet::new();
        for page in self.registry.pages()? {
            for revision in self.revisions.history(&page.id)? {
                if revision?.author.id == author_id {
                    titles.insert(page.title);
                    break;
                }
            }
        }
        Ok(titles)
    }
}

fn validate_title(title: &str) -> Result<(), WikiError> {
    if title.is_empty() {
        return Err(WikiError::MalformedInput("page title is empty".to_owned()));
    }
    if title.chars().any(char::is_control) {
        return Err(WikiError::MalformedInput(format!(
            "page title contains control characters: {title:?}"
        )));
    }
    Ok(())
}
