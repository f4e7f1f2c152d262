//! MongoDB-backed store.

use async_trait::async_trait;
use bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Cursor, Database, IndexModel};

use crate::error::StoreError;
use crate::index::IndexSpec;
use crate::store::{LibraryStore, ScoredDocument};

const APP_NAME: &str = "library-setup";
const DUPLICATE_KEY_CODE: &str = "E11000";
const TEXT_INDEX_REQUIRED: &str = "text index required";
const SCORE_FIELD: &str = "score";

/// Store backed by a live MongoDB deployment.
#[derive(Debug, Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect to `uri`, verify the deployment answers a ping and target database `name`.
    pub async fn connect(uri: &str, name: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some(APP_NAME.to_string());
        let client = Client::with_options(options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        tracing::info!(target: "library-db", database = name, "connected to MongoDB");
        Ok(Self::from_database(client.database(name)))
    }

    pub fn from_database(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    fn map_error(collection: &str, error: mongodb::error::Error) -> StoreError {
        let message = error.to_string();
        if message.contains(DUPLICATE_KEY_CODE) {
            let (index, key) = parse_duplicate_key(&message);
            return StoreError::DuplicateKey {
                collection: collection.to_string(),
                index,
                key,
            };
        }
        if message.contains(TEXT_INDEX_REQUIRED) {
            return StoreError::NoTextIndex(collection.to_string());
        }
        StoreError::Mongo(error)
    }
}

/// Pull the index name and offending key out of an `E11000` server message.
fn parse_duplicate_key(message: &str) -> (String, String) {
    let index = message
        .split("index: ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("unknown")
        .to_string();
    let key = message
        .split("dup key: ")
        .nth(1)
        .map(|rest| rest.trim_end_matches(|c: char| c == ',' || c == ')').trim().to_string())
        .unwrap_or_default();
    (index, key)
}

async fn drain(mut cursor: Cursor<Document>) -> Result<Vec<Document>, mongodb::error::Error> {
    let mut documents = Vec::new();
    while cursor.advance().await? {
        documents.push(cursor.deserialize_current()?);
    }
    Ok(documents)
}

#[async_trait]
impl LibraryStore for MongoStore {
    fn name(&self) -> &str {
        self.database.name()
    }

    async fn drop_database(&self) -> Result<(), StoreError> {
        self.database.drop().await?;
        Ok(())
    }

    async fn create_collection(&self, collection: &str) -> Result<(), StoreError> {
        self.database.create_collection(collection).await?;
        Ok(())
    }

    async fn create_index(
        &self,
        collection: &str,
        index: &IndexSpec,
    ) -> Result<String, StoreError> {
        let mut options = IndexOptions::default();
        options.name = index.name.clone();
        options.weights = index.weights_document();
        if index.unique {
            options.unique = Some(true);
        }

        let model = IndexModel::builder()
            .keys(index.keys_document())
            .options(options)
            .build();

        let created = self
            .collection(collection)
            .create_index(model)
            .await
            .map_err(|error| Self::map_error(collection, error))?;
        Ok(created.index_name)
    }

    async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.collection(collection).list_index_names().await?)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        let result = self
            .collection(collection)
            .insert_many(documents)
            .await
            .map_err(|error| Self::map_error(collection, error))?;
        Ok(result.inserted_ids.len())
    }

    async fn count_documents(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, StoreError> {
        Ok(self.collection(collection).count_documents(filter).await?)
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection(collection).find(filter).await?;
        Ok(drain(cursor).await?)
    }

    async fn text_search(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        let relevance = doc! { "score": { "$meta": "textScore" } };
        let cursor = self
            .collection(collection)
            .find(doc! { "$text": { "$search": query } })
            .projection(relevance.clone())
            .sort(relevance)
            .await
            .map_err(|error| Self::map_error(collection, error))?;

        let hits = drain(cursor)
            .await
            .map_err(|error| Self::map_error(collection, error))?
            .into_iter()
            .map(|mut document| {
                let score = document
                    .remove(SCORE_FIELD)
                    .and_then(|score| score.as_f64())
                    .unwrap_or_default();
                ScoredDocument { document, score }
            })
            .collect();
        Ok(hits)
    }

    async fn stats(&self) -> Result<Document, StoreError> {
        Ok(self.database.run_command(doc! { "dbStats": 1 }).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_is_parsed() {
        let message = "Kind: Command failed: Error code 11000 (DuplicateKey): E11000 duplicate key \
                       error collection: library.books index: isbn_1 dup key: { isbn: \"978-0451524935\" }";
        let (index, key) = parse_duplicate_key(message);
        assert_eq!(index, "isbn_1");
        assert_eq!(key, "{ isbn: \"978-0451524935\" }");
    }

    #[test]
    fn unparseable_duplicate_message_falls_back() {
        let (index, key) = parse_duplicate_key("E11000 duplicate key error");
        assert_eq!(index, "unknown");
        assert!(key.is_empty());
    }
}
