use std::fmt::{self, Display, Formatter};

/// Boxed error type used for store failures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by repositories and stores.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the content core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up.
        entity: Entity,
        /// Identifier that did not match.
        id: String,
    },

    /// The input was malformed or empty.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An uploaded file is not of an accepted media type.
    #[error("unsupported media: {0}")]
    UnsupportedMedia(String),

    /// The document store was unreachable or the operation failed.
    #[error("store error: {0}")]
    Store(#[source] BoxedError),
}

impl Error {
    /// Creates a [`Error::NotFound`] for the given entity and id.
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wraps any store level failure.
    pub fn store<E>(err: E) -> Self
    where
        E: Into<BoxedError>,
    {
        Self::Store(err.into())
    }

    /// Returns `true` if this is a [`Error::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Kinds of records managed by the core, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// A [`Category`](crate::models::Category).
    Category,
    /// An [`Article`](crate::models::Article).
    Article,
    /// A [`Comment`](crate::models::Comment).
    Comment,
}

impl Entity {
    /// Human readable name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Article => "article",
            Self::Comment => "comment",
        }
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found(Entity::Article, "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "article not found: abc");
    }

    #[test]
    fn test_store_error_keeps_source() {
        let io = std::io::Error::other("connection reset");
        let err = Error::store(io);
        assert!(!err.is_not_found());
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "store error: connection reset");
    }
}
