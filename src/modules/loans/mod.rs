pub mod consistency;
pub mod models;

use anyhow::Context;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson};
use library_db::{IndexSpec, LibraryStore};
use library_kernel::{InitCtx, Module};

use crate::modules::books;
use crate::utils;
use consistency::Inconsistency;
use models::{Loan, LoanStatus};

pub const COLLECTION: &str = "loans";

pub struct LoansModule;

#[async_trait]
impl Module for LoansModule {
    fn name(&self) -> &'static str {
        "loans"
    }

    fn collection(&self) -> &'static str {
        COLLECTION
    }

    fn indexes(&self) -> Vec<IndexSpec> {
        vec![
            // "is this book currently out"
            IndexSpec::compound(&["bookId", "returnDate"]),
            // "what does this member have out"
            IndexSpec::compound(&["memberId", "status"]),
        ]
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), database = ctx.store.name(), "loans module initialized");
        Ok(())
    }
}

/// Loans a member currently has out, keyed by the member's `_id`.
pub async fn open_loans_for_member(
    store: &dyn LibraryStore,
    member: ObjectId,
) -> anyhow::Result<Vec<Loan>> {
    let filter = doc! { "memberId": member, "status": LoanStatus::OnLoan.as_str() };
    let documents = store
        .find(COLLECTION, filter)
        .await
        .with_context(|| format!("failed to read open loans for member {member}"))?;
    utils::from_documents(documents)
}

/// Unreturned loans on any copy of the book.
pub async fn open_loans_for_book(
    store: &dyn LibraryStore,
    book: ObjectId,
) -> anyhow::Result<Vec<Loan>> {
    let filter = doc! { "bookId": book, "returnDate": Bson::Null };
    let documents = store
        .find(COLLECTION, filter)
        .await
        .with_context(|| format!("failed to read open loans for book {book}"))?;
    utils::from_documents(documents)
}

pub async fn all(store: &dyn LibraryStore) -> anyhow::Result<Vec<Loan>> {
    let documents = store
        .find(COLLECTION, doc! {})
        .await
        .context("failed to read loans")?;
    utils::from_documents(documents)
}

/// Compare stored loans against the copy statuses embedded in books.
pub async fn audit(store: &dyn LibraryStore) -> anyhow::Result<Vec<Inconsistency>> {
    let books = books::all(store).await?;
    let loans = all(store).await?;
    let findings = consistency::check(&books, &loans);

    for finding in &findings {
        tracing::warn!(%finding, "loan and copy status disagree");
    }
    Ok(findings)
}

pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(LoansModule)
}
