pub mod models;

use anyhow::Context;
use async_trait::async_trait;
use bson::doc;
use library_db::{IndexSpec, LibraryStore};
use library_kernel::{InitCtx, Module};

use crate::utils;
use models::Book;

pub const COLLECTION: &str = "books";
pub const SEARCH_INDEX: &str = "book_search_index";

/// Text index weights; a title hit outranks an author hit, which outranks a publisher hit.
pub const SEARCH_WEIGHTS: &[(&str, i32)] = &[("title", 10), ("authors.name", 5), ("publisher", 3)];

/// Catalogue of titles with embedded authors and copies
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn collection(&self) -> &'static str {
        COLLECTION
    }

    fn indexes(&self) -> Vec<IndexSpec> {
        vec![
            IndexSpec::ascending("isbn").unique(),
            IndexSpec::ascending("genre"),
            IndexSpec::ascending("copies.status"),
            // Only one text index is allowed per collection, so every searchable
            // field shares this one.
            IndexSpec::text(SEARCH_INDEX, SEARCH_WEIGHTS),
        ]
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            database = ctx.store.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }
}

/// A book matched by a text search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub book: Book,
    pub score: f64,
}

/// Full-text search over title, author names and publisher, best match first.
pub async fn search(store: &dyn LibraryStore, text: &str) -> anyhow::Result<Vec<SearchHit>> {
    let hits = store
        .text_search(COLLECTION, text)
        .await
        .with_context(|| format!("text search for '{text}' failed"))?;

    hits.into_iter()
        .map(|hit| -> anyhow::Result<SearchHit> {
            let book: Book = bson::from_document(hit.document).context("failed to decode book")?;
            Ok(SearchHit {
                book,
                score: hit.score,
            })
        })
        .collect()
}

pub async fn find_by_isbn(store: &dyn LibraryStore, isbn: &str) -> anyhow::Result<Option<Book>> {
    let documents = store
        .find(COLLECTION, doc! { "isbn": isbn })
        .await
        .with_context(|| format!("failed to look up isbn {isbn}"))?;
    Ok(utils::from_documents(documents)?.into_iter().next())
}

pub async fn all(store: &dyn LibraryStore) -> anyhow::Result<Vec<Book>> {
    let documents = store
        .find(COLLECTION, doc! {})
        .await
        .context("failed to read books")?;
    utils::from_documents(documents)
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
