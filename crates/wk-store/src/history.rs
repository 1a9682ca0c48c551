//! Lazy revision history iterator.

use std::fmt;

use crate::model::Revision;
use crate::storage::StorageError;

type BoxedIter = Box<dyn Iterator<Item = Result<Revision, StorageError>> + Send>;

/// Revisions of one page, newest first.
///
/// Backends may load revisions lazily, so each item is a `Result`. The
/// iterator is finite and not restartable; call
/// [`Storage::revisions`](crate::Storage::revisions) again for a fresh snapshot.
pub struct History {
    inner: BoxedIter,
}

impl History {
    /// Wrap a backend iterator. Items must already be in descending version order.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<Revision, StorageError>> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    /// History of a page without revisions.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for History {
    type Item = Result<Revision, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::{AuthorRef, PageId};

    #[test]
    fn test_empty_history() {
        assert_eq!(History::empty().count(), 0);
    }

    #[test]
    fn test_history_preserves_order() {
        let author = AuthorRef::new("ada", "Ada", "ada@example.com");
        let revisions: Vec<Result<Revision, StorageError>> = (1..=3)
            .rev()
            .map(|v| Ok(Revision::new(PageId::new("p"), v, "", author.clone(), Utc::now())))
            .collect();

        let versions: Vec<u64> = History::new(revisions.into_iter())
            .map(|r| r.unwrap().version)
            .collect();
        assert_eq!(versions, vec![3, 2, 1]);
    }
}
