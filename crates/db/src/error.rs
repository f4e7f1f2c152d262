//! Error type shared by every store backend.

use thiserror::Error;

/// Failures surfaced by a [`crate::LibraryStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate key in {collection}.{index}: {key}")]
    DuplicateKey {
        collection: String,
        index: String,
        key: String,
    },

    #[error("collection {collection} already has text index {existing}; cannot add {requested}")]
    TextIndexConflict {
        collection: String,
        existing: String,
        requested: String,
    },

    #[error("text search on {0} requires a text index")]
    NoTextIndex(String),

    #[error("unsupported filter operator {0}")]
    UnsupportedFilter(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error(transparent)]
    Serialization(#[from] bson::ser::Error),

    #[error(transparent)]
    Deserialization(#[from] bson::de::Error),
}

impl StoreError {
    /// True for uniqueness violations, whichever backend produced them.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_names_the_index() {
        let error = StoreError::DuplicateKey {
            collection: "books".to_string(),
            index: "isbn_1".to_string(),
            key: "\"978-0451524935\"".to_string(),
        };
        assert!(error.is_duplicate_key());
        assert_eq!(
            error.to_string(),
            "duplicate key in books.isbn_1: \"978-0451524935\""
        );
    }

    #[test]
    fn unsupported_filter_is_not_duplicate() {
        assert!(!StoreError::UnsupportedFilter("$gt".to_string()).is_duplicate_key());
    }
}
