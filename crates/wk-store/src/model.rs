//! Page, revision and author records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque page identity assigned by the storage backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Wrap a backend-specific identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A uniquely titled document identity.
///
/// Pages are created on the first save of an unknown title and never change
/// afterwards. The title is compared byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Backend-assigned identity.
    pub id: PageId,
    /// Case-sensitive title, unique across the store.
    pub title: String,
    /// When the page was first created.
    pub created_at: DateTime<Utc>,
}

/// Reference to an externally owned author profile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorRef {
    /// Identity key in the profile system.
    pub id: String,
    /// Display name used for attribution.
    pub name: String,
    /// Contact address.
    pub email: String,
}

impl AuthorRef {
    /// Create an author reference.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// One immutable, version-numbered snapshot of a page body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Owning page.
    pub page: PageId,
    /// Version number, starting at 1 and increasing by one per append.
    pub version: u64,
    /// Raw (unrendered) body text.
    pub body: String,
    /// Author who saved this revision.
    pub author: AuthorRef,
    /// When the revision was created.
    pub created_at: DateTime<Utc>,
}

impl Revision {
    /// Create a revision record.
    #[must_use]
    pub fn new(
        page: PageId,
        version: u64,
        body: impl Into<String>,
        author: AuthorRef,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            page,
            version,
            body: body.into(),
            author,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_display() {
        let id = PageId::new("5374617274");
        assert_eq!(id.to_string(), "5374617274");
        assert_eq!(id.as_str(), "5374617274");
    }

    #[test]
    fn test_page_id_serializes_transparently() {
        let json = serde_json::to_string(&PageId::new("abc")).unwrap();
        assert_eq!(json, r#""abc""#);
    }

    #[test]
    fn test_revision_json_shape() {
        let created_at = DateTime::parse_from_rfc3339("2008-04-07T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let revision = Revision::new(
            PageId::new("p1"),
            3,
            "Body",
            AuthorRef::new("ada", "Ada", "ada@example.com"),
            created_at,
        );

        let value = serde_json::to_value(&revision).unwrap();
        assert_eq!(value["page"], "p1");
        assert_eq!(value["version"], 3);
        assert_eq!(value["author"]["name"], "Ada");

        let back: Revision = serde_json::from_value(value).unwrap();
        assert_eq!(back, revision);
    }
}
