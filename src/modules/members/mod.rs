pub mod models;

use anyhow::Context;
use async_trait::async_trait;
use bson::doc;
use library_db::{IndexSpec, LibraryStore};
use library_kernel::{InitCtx, Module};

use crate::utils;
use models::Member;

pub const COLLECTION: &str = "members";

pub struct MembersModule;

#[async_trait]
impl Module for MembersModule {
    fn name(&self) -> &'static str {
        "members"
    }

    fn collection(&self) -> &'static str {
        COLLECTION
    }

    fn indexes(&self) -> Vec<IndexSpec> {
        vec![
            IndexSpec::ascending("memberId").unique(),
            IndexSpec::ascending("email").unique(),
        ]
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), database = ctx.store.name(), "members module initialized");
        Ok(())
    }
}

/// Look a member up by membership number.
pub async fn find_by_member_id(
    store: &dyn LibraryStore,
    member_id: &str,
) -> anyhow::Result<Option<Member>> {
    let documents = store
        .find(COLLECTION, doc! { "memberId": member_id })
        .await
        .with_context(|| format!("failed to look up member {member_id}"))?;
    Ok(utils::from_documents(documents)?.into_iter().next())
}

pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(MembersModule)
}
