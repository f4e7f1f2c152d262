//! In-process store with MongoDB-compatible index semantics.
//!
//! Supports what the setup pipeline relies on: unique indexes (a missing
//! field counts as null), one weighted text index per collection, ordered
//! batch inserts and equality filters over dotted paths. Cloned handles
//! share state.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::index::IndexSpec;
use crate::store::{LibraryStore, ScoredDocument};

const ID_INDEX: &str = "_id_";

#[derive(Debug)]
struct CollectionState {
    documents: Vec<Document>,
    indexes: Vec<IndexSpec>,
}

impl CollectionState {
    fn new() -> Self {
        let mut id_index = IndexSpec::ascending("_id").unique();
        id_index.name = Some(ID_INDEX.to_string());
        Self {
            documents: Vec::new(),
            indexes: vec![id_index],
        }
    }

    fn text_index(&self) -> Option<&IndexSpec> {
        self.indexes.iter().find(|index| index.is_text())
    }

    /// Reject `document` if it collides with an existing one on any unique index.
    fn check_unique(&self, collection: &str, document: &Document) -> Result<(), StoreError> {
        for index in self.indexes.iter().filter(|index| index.unique) {
            let key = unique_key(index, document);
            if self
                .documents
                .iter()
                .any(|existing| unique_key(index, existing) == key)
            {
                return Err(duplicate(collection, index, &key));
            }
        }
        Ok(())
    }
}

/// In-memory database handle.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    name: String,
    collections: Arc<Mutex<BTreeMap<String, CollectionState>>>,
}

impl MemoryStore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            collections: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

fn unique_key(index: &IndexSpec, document: &Document) -> Document {
    let mut key = Document::new();
    for field in index.fields() {
        let value = values_at(document, field)
            .into_iter()
            .next()
            .cloned()
            .unwrap_or(Bson::Null);
        key.insert(field, value);
    }
    key
}

fn duplicate(collection: &str, index: &IndexSpec, key: &Document) -> StoreError {
    StoreError::DuplicateKey {
        collection: collection.to_string(),
        index: index.name(),
        key: key.to_string(),
    }
}

/// Every value reachable through a dotted `path`, descending into arrays of
/// sub-documents. Arrays at the leaf are flattened into their elements.
pub(crate) fn values_at<'a>(document: &'a Document, path: &str) -> Vec<&'a Bson> {
    let mut segments = path.split('.');
    let mut current: Vec<&Bson> = segments
        .next()
        .and_then(|first| document.get(first))
        .into_iter()
        .collect();

    for segment in segments {
        let mut next = Vec::new();
        for value in current {
            match value {
                Bson::Document(inner) => next.extend(inner.get(segment)),
                Bson::Array(items) => {
                    for item in items {
                        if let Bson::Document(inner) = item {
                            next.extend(inner.get(segment));
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }

    current
        .into_iter()
        .flat_map(|value| match value {
            Bson::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect()
}

fn matches(document: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (path, expected) in filter {
        if path.starts_with('$') {
            return Err(StoreError::UnsupportedFilter(path.clone()));
        }
        if let Bson::Document(inner) = expected {
            if let Some(operator) = inner.keys().find(|key| key.starts_with('$')) {
                return Err(StoreError::UnsupportedFilter(operator.clone()));
            }
        }

        let values = values_at(document, path);
        let hit = match expected {
            Bson::Null => values.is_empty() || values.iter().any(|value| **value == Bson::Null),
            _ => values.iter().any(|value| *value == expected),
        };
        if !hit {
            return Ok(false);
        }
    }
    Ok(true)
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Sum over text-indexed fields of `weight * occurrences of query terms`.
fn relevance(index: &IndexSpec, document: &Document, terms: &[String]) -> f64 {
    index
        .fields()
        .map(|field| {
            let occurrences: usize = values_at(document, field)
                .into_iter()
                .filter_map(Bson::as_str)
                .flat_map(tokenize)
                .filter(|token| terms.contains(token))
                .count();
            f64::from(index.weight(field)) * occurrences as f64
        })
        .sum()
}

#[async_trait]
impl LibraryStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn drop_database(&self) -> Result<(), StoreError> {
        let dropped = {
            let mut collections = self.collections.lock();
            let count = collections.len();
            collections.clear();
            count
        };
        tracing::debug!(target: "library-db", database = %self.name, dropped, "memory database dropped");
        Ok(())
    }

    async fn create_collection(&self, collection: &str) -> Result<(), StoreError> {
        self.collections
            .lock()
            .entry(collection.to_string())
            .or_insert_with(CollectionState::new);
        Ok(())
    }

    async fn create_index(
        &self,
        collection: &str,
        index: &IndexSpec,
    ) -> Result<String, StoreError> {
        let mut collections = self.collections.lock();
        let state = collections
            .entry(collection.to_string())
            .or_insert_with(CollectionState::new);
        let name = index.name();

        if state.indexes.iter().any(|existing| existing == index) {
            return Ok(name);
        }

        if index.is_text() {
            if let Some(existing) = state.text_index() {
                return Err(StoreError::TextIndexConflict {
                    collection: collection.to_string(),
                    existing: existing.name(),
                    requested: name,
                });
            }
        }

        if index.unique {
            let mut seen: Vec<Document> = Vec::with_capacity(state.documents.len());
            for document in &state.documents {
                let key = unique_key(index, document);
                if seen.contains(&key) {
                    return Err(duplicate(collection, index, &key));
                }
                seen.push(key);
            }
        }

        state.indexes.push(index.clone());
        Ok(name)
    }

    async fn index_names(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .collections
            .lock()
            .get(collection)
            .map(|state| state.indexes.iter().map(IndexSpec::name).collect())
            .unwrap_or_default())
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        let mut collections = self.collections.lock();
        let state = collections
            .entry(collection.to_string())
            .or_insert_with(CollectionState::new);

        let mut inserted = 0;
        for mut document in documents {
            if !document.contains_key("_id") {
                document.insert("_id", ObjectId::new());
            }
            state.check_unique(collection, &document)?;
            state.documents.push(document);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn count_documents(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, StoreError> {
        Ok(self.find(collection, filter).await?.len() as u64)
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock();
        let Some(state) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for document in &state.documents {
            if matches(document, &filter)? {
                found.push(document.clone());
            }
        }
        Ok(found)
    }

    async fn text_search(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        let collections = self.collections.lock();
        let index = collections
            .get(collection)
            .and_then(|state| state.text_index().map(|index| (state, index)));
        let Some((state, index)) = index else {
            return Err(StoreError::NoTextIndex(collection.to_string()));
        };

        let terms = tokenize(query);
        let mut hits: Vec<ScoredDocument> = state
            .documents
            .iter()
            .map(|document| ScoredDocument {
                score: relevance(index, document, &terms),
                document: document.clone(),
            })
            .filter(|hit| hit.score > 0.0)
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }

    async fn stats(&self) -> Result<Document, StoreError> {
        let collections = self.collections.lock();
        let objects: usize = collections.values().map(|state| state.documents.len()).sum();
        let indexes: usize = collections.values().map(|state| state.indexes.len()).sum();
        Ok(doc! {
            "db": self.name.clone(),
            "collections": collections.len() as i64,
            "objects": objects as i64,
            "indexes": indexes as i64,
            "ok": 1.0,
        })
    }
}
