//! Error type for wiki operations.

use wk_store::{StorageError, StorageErrorKind};

/// Error returned by wiki operations.
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    /// No page has the requested title.
    #[error("Page not found: {title}")]
    NotFound {
        /// Requested title.
        title: String,
    },
    /// Concurrent writers kept winning until the retry budget ran out.
    #[error("Version conflict on {title} after {attempts} attempts")]
    VersionConflict {
        /// Title of the contended page.
        title: String,
        /// Number of insert attempts made.
        attempts: u32,
    },
    /// The storage backend failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
    /// Caller input was rejected before touching storage.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl WikiError {
    pub(crate) fn not_found(title: &str) -> Self {
        Self::NotFound {
            title: title.to_owned(),
        }
    }

    /// Classify a backend error raised while working on `title`.
    ///
    /// A missing page surfaces as [`WikiError::NotFound`] and a title the
    /// backend cannot map as [`WikiError::MalformedInput`].
    pub(crate) fn from_storage(title: &str, err: StorageError) -> Self {
        match err.kind {
            StorageErrorKind::NotFound => Self::not_found(title),
            StorageErrorKind::InvalidPath => Self::MalformedInput(format!(
                "page title cannot be stored ({} bytes)",
                title.len()
            )),
            _ => Self::StorageUnavailable(err),
        }
    }

    /// Whether retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::VersionConflict { .. } => true,
            Self::StorageUnavailable(e) => e.status != wk_store::ErrorStatus::Permanent,
            Self::NotFound { .. } | Self::MalformedInput(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            WikiError::not_found("Missing").to_string(),
            "Page not found: Missing"
        );
        assert_eq!(
            WikiError::VersionConflict {
                title: "Busy".to_owned(),
                attempts: 8
            }
            .to_string(),
            "Version conflict on Busy after 8 attempts"
        );
        assert_eq!(
            WikiError::MalformedInput("page title is empty".to_owned()).to_string(),
            "Malformed input: page title is empty"
        );
    }

    #[test]
    fn test_storage_error_converts() {
        let err: WikiError = StorageError::new(StorageErrorKind::Corrupted)
            .with_backend("Fs")
            .into();
        assert_eq!(err.to_string(), "Storage unavailable: [Fs] Corrupted");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_is_retryable() {
        assert!(WikiError::StorageUnavailable(StorageError::poisoned()).is_retryable());
        assert!(
            WikiError::VersionConflict {
                title: "Busy".to_owned(),
                attempts: 1
            }
            .is_retryable()
        );
        assert!(!WikiError::not_found("Missing").is_retryable());
    }

    #[test]
    fn test_from_storage_classifies_by_kind() {
        let missing = WikiError::from_storage("Ghost", StorageError::new(StorageErrorKind::NotFound));
        assert!(matches!(missing, WikiError::NotFound { ref title } if title == "Ghost"));

        let invalid =
            WikiError::from_storage("Long", StorageError::new(StorageErrorKind::InvalidPath));
        assert_eq!(
            invalid.to_string(),
            "Malformed input: page title cannot be stored (4 bytes)"
        );

        let corrupted =
            WikiError::from_storage("Test", StorageError::new(StorageErrorKind::Corrupted));
        assert!(matches!(corrupted, WikiError::StorageUnavailable(_)));
    }
}
