//! Revision model and page operations for wk.
//!
//! This crate ties the persistence layer and the renderer together:
//! - [`ContentRegistry`]: unique title to page identity
//! - [`RevisionStore`]: version assignment and history, safe under concurrent
//!   writers
//! - [`Wiki`]: the operations callers use (read, save, history, render)
//!
//! Author profiles live outside the wiki and are reached through
//! [`AuthorDirectory`].
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), wk_core::WikiError> {
//! use std::sync::Arc;
//! use wk_core::{Wiki, WikiConfig};
//! use wk_store::{AuthorRef, MemoryStorage};
//!
//! let wiki = Wiki::new(Arc::new(MemoryStorage::new()), WikiConfig::default());
//! let ada = AuthorRef::new("ada", "Ada", "ada@example.com");
//!
//! wiki.save_page("Test", "Hello WikiWord", &ada)?;
//! wiki.save_page("Test", "v2", &ada)?;
//!
//! let versions: Vec<u64> = wiki
//!     .page_history("Test")?
//!     .map(|revision| revision.map(|r| r.version))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(versions, vec![2, 1]);
//! # Ok(())
//! # }
//! ```

mod author;
mod error;
mod registry;
mod revisions;
mod wiki;

pub use author::{AuthorDirectory, StaticAuthorDirectory};
pub use error::WikiError;
pub use registry::ContentRegistry;
pub use revisions::{DEFAULT_MAX_APPEND_ATTEMPTS, RevisionStore};
pub use wiki::{DEFAULT_FRONT_PAGE, ResolvedPage, RevisionSummary, Wiki, WikiConfig};

// Re-export the types that appear in this crate's API.
pub use wk_renderer::{RenderedBody, TocEntry};
pub use wk_store::{AuthorRef, History, Page, PageId, Revision};
