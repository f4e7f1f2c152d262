use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bson::Document;
use serde::Deserialize;

use crate::error::StoreError;
use crate::index::IndexSpec;
use crate::memory::MemoryStore;
use crate::mongo::MongoStore;

/// A document returned by a text search together with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f64,
}

/// Handle to a single database.
///
/// Every call completes (or fails) before returning; callers drive the
/// operations strictly in program order.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Name of the database this handle targets.
    fn name(&self) -> &str;

    /// Drop the whole database. Dropping a database that does not exist succeeds.
    async fn drop_database(&self) -> Result<(), StoreError>;

    async fn create_collection(&self, collection: &str) -> Result<(), StoreError>;

    /// Create `index` on `collection` and return the index name.
    async fn create_index(&self, collection: &str, index: &IndexSpec)
        -> Result<String, StoreError>;

    async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError>;

    /// Ordered batch insert. Stops at the first failing document.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError>;

    async fn count_documents(&self, collection: &str, filter: Document)
        -> Result<u64, StoreError>;

    async fn find(&self, collection: &str, filter: Document)
        -> Result<Vec<Document>, StoreError>;

    /// Relevance-ranked search over the collection's text index, best match first.
    async fn text_search(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<Vec<ScoredDocument>, StoreError>;

    /// Database statistics as reported by the backend.
    async fn stats(&self) -> Result<Document, StoreError>;
}

/// Storage backend selected through settings or the command line.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Mongo,
    Memory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Mongo => f.write_str("mongo"),
            Backend::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Backend::Mongo),
            "memory" => Ok(Backend::Memory),
            other => Err(format!(
                "unsupported backend '{other}'; expected mongo/memory"
            )),
        }
    }
}

/// Open a handle to database `name` on the chosen backend.
pub async fn connect(
    backend: Backend,
    uri: &str,
    name: &str,
) -> Result<Box<dyn LibraryStore>, StoreError> {
    tracing::info!(target: "library-db", %backend, database = name, "opening store");

    match backend {
        Backend::Mongo => Ok(Box::new(MongoStore::connect(uri, name).await?)),
        Backend::Memory => Ok(Box::new(MemoryStore::new(name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<Backend>(), Ok(Backend::Memory));
        assert_eq!("mongodb".parse::<Backend>(), Ok(Backend::Mongo));
        assert!("sqlite".parse::<Backend>().is_err());
    }

    #[tokio::test]
    async fn connect_memory_backend_ignores_uri() {
        let store = connect(Backend::Memory, "unused", "library").await.unwrap();
        assert_eq!(store.name(), "library");
        assert_eq!(store.count_documents("books", Document::new()).await.unwrap(), 0);
    }
}
