//! Errors surfaced by repository operations.
//!
//! Driver errors are carried as-is inside [`RepositoryError::Database`] and
//! [`RepositoryError::Document`]; nothing here rewrites or retries them.

use thiserror::Error;

/// Errors returned by every [`Repository`](crate::domain::ports::Repository)
/// implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row or document matches the requested id.
    #[error("{collection} not found: {id}")]
    NotFound {
        /// Table or collection searched.
        collection: String,
        /// The requested id, rendered with `Display`.
        id: String,
    },

    /// The backend cannot perform the requested operation.
    #[error("{operation} is not supported by the {backend} backend: {reason}")]
    Unsupported {
        /// Backend name, e.g. `sqlite` or `mongodb`.
        backend: &'static str,
        /// Repository operation that was attempted.
        operation: &'static str,
        /// Why it cannot be performed.
        reason: String,
    },

    /// Relational driver error, passed through unchanged.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Document-store driver error, passed through unchanged.
    #[error(transparent)]
    Document(#[from] mongodb::error::Error),

    /// An entity could not be encoded as BSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    /// A stored document could not be decoded into the entity.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),
}

impl RepositoryError {
    pub(crate) fn not_found(collection: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.to_string(),
        }
    }

    /// Whether this is a [`RepositoryError::NotFound`].
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is a [`RepositoryError::Unsupported`].
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result of a repository operation.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = RepositoryError::not_found("people", 42);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "people not found: 42");
    }

    #[test]
    fn test_driver_error_is_transparent() {
        let err: RepositoryError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::PoolTimedOut)));
        assert_eq!(err.to_string(), sqlx::Error::PoolTimedOut.to_string());
    }

    #[test]
    fn test_unsupported_message() {
        let err = RepositoryError::Unsupported {
            backend: "mongodb",
            operation: "update",
            reason: "entity does not serialize to a document".to_string(),
        };
        assert!(err.is_unsupported());
        assert!(err.to_string().starts_with("update is not supported by the mongodb backend"));
    }
}
