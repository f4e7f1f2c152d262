//! The initializer: reset, collections, indexes, fixtures, verification.
//!
//! Each step runs to completion before the next; the first failure aborts
//! the run and may leave a partially provisioned database behind.

use anyhow::Context;
use bson::doc;
use library_db::LibraryStore;
use library_kernel::settings::Settings;
use library_kernel::{InitCtx, ModuleRegistry};

use crate::fixtures::LibraryFixtures;
use crate::modules::{self, books, loans, members};
use crate::report::VerificationReport;

/// Provision the library database behind `store` from scratch.
pub async fn run(
    store: &dyn LibraryStore,
    settings: &Settings,
) -> anyhow::Result<VerificationReport> {
    let fixtures = LibraryFixtures::build().context("failed to build fixtures")?;
    fixtures.validate().context("fixtures failed validation")?;

    reset(store).await?;

    tracing::info!(database = store.name(), "creating library database");
    let registry = modules::registry();
    provision(&registry, store, settings).await?;
    tracing::info!("indexes created successfully");

    insert_fixtures(store, &fixtures).await?;
    tracing::info!("sample data inserted successfully");

    verify(store).await
}

/// Drop the target database. A missing database is not an error.
pub async fn reset(store: &dyn LibraryStore) -> anyhow::Result<()> {
    store
        .drop_database()
        .await
        .with_context(|| format!("failed to drop database '{}'", store.name()))?;
    tracing::info!(database = store.name(), "database dropped");
    Ok(())
}

/// Create every collection and its indexes, then run the module hooks.
pub async fn provision(
    registry: &ModuleRegistry,
    store: &dyn LibraryStore,
    settings: &Settings,
) -> anyhow::Result<()> {
    let ctx = InitCtx { settings, store };

    registry.create_collections(&ctx).await?;
    registry.create_indexes(&ctx).await?;
    registry.init_modules(&ctx).await
}

/// One batch insert per collection, books first, loans last.
pub async fn insert_fixtures(
    store: &dyn LibraryStore,
    fixtures: &LibraryFixtures,
) -> anyhow::Result<()> {
    for (collection, documents) in fixtures.documents()? {
        let inserted = store
            .insert_many(collection, documents)
            .await
            .with_context(|| format!("failed to insert fixtures into '{collection}'"))?;
        tracing::info!(collection, inserted, "fixtures inserted");
    }
    Ok(())
}

/// Gather statistics, counts and the loan/copy audit. Nothing is asserted.
pub async fn verify(store: &dyn LibraryStore) -> anyhow::Result<VerificationReport> {
    let stats = store.stats().await.context("failed to read database stats")?;

    let count = |collection: &'static str| async move {
        store
            .count_documents(collection, doc! {})
            .await
            .with_context(|| format!("failed to count '{collection}'"))
    };

    Ok(VerificationReport {
        stats,
        books: count(books::COLLECTION).await?,
        members: count(members::COLLECTION).await?,
        loans: count(loans::COLLECTION).await?,
        findings: loans::audit(store).await?,
    })
}
