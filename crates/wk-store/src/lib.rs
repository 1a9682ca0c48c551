//! Persistence substrate for the wk wiki.
//!
//! This crate provides a [`Storage`] trait for keyed page and revision storage,
//! decoupling the revision model from the backend that holds it. It supplies
//! exactly the primitives the revision model needs:
//!
//! - point lookups of pages by title
//! - conditional page creation (fails with `AlreadyExists` on a duplicate title)
//! - conditional revision insert (fails with `AlreadyExists` unless the version
//!   is the page's current head + 1)
//! - the query "all revisions for a page, newest first" as a lazy [`History`]
//!
//! # Backends
//!
//! - [`MemoryStorage`]: process-local maps, inserts serialized per page
//! - [`FsStorage`]: JSON documents under a data directory, with an atomic
//!   link-if-absent as the conditional write
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use wk_store::{AuthorRef, MemoryStorage, Revision, Storage};
//!
//! let storage = MemoryStorage::new();
//! let page = storage.create_page("StartPage").unwrap();
//! let author = AuthorRef::new("ada", "Ada", "ada@example.com");
//! let revision = Revision::new(page.id.clone(), 1, "Hello WikiWord", author, Utc::now());
//! storage.insert_revision(&revision).unwrap();
//!
//! let latest = storage.latest_revision(&page.id).unwrap().unwrap();
//! assert_eq!(latest.version, 1);
//! ```

mod fs;
mod history;
mod memory;
mod model;
mod storage;

pub use fs::FsStorage;
pub use history::History;
pub use memory::MemoryStorage;
pub use model::{AuthorRef, Page, PageId, Revision};
pub use storage::{ErrorStatus, Storage, StorageError, StorageErrorKind};
