//! Author profile lookup.

use std::collections::HashMap;

use wk_store::AuthorRef;

/// External profile system that resolves author identities.
///
/// The wiki never owns author records; callers resolve the author before
/// saving and pass the [`AuthorRef`] explicitly.
pub trait AuthorDirectory: Send + Sync {
    /// Look up an author by identity key.
    fn lookup_author(&self, id: &str) -> Option<AuthorRef>;
}

/// Fixed in-memory author directory.
#[derive(Clone, Debug, Default)]
pub struct StaticAuthorDirectory {
    authors: HashMap<String, AuthorRef>,
}

impl StaticAuthorDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an author, keyed by its id.
    pub fn insert(&mut self, author: AuthorRef) {
        self.authors.insert(author.id.clone(), author);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.authors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

impl FromIterator<AuthorRef> for StaticAuthorDirectory {
    fn from_iter<I: IntoIterator<Item = AuthorRef>>(iter: I) -> Self {
        let mut directory = Self::new();
        for author in iter {
            directory.insert(author);
        }
        directory
    }
}

impl AuthorDirectory for StaticAuthorDirectory {
    fn lookup_author(&self, id: &str) -> Option<AuthorRef> {
        self.authors.get(id).cloned()
    }
}
