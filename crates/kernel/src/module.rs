use async_trait::async_trait;
use library_db::{IndexSpec, LibraryStore};

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub store: &'a dyn LibraryStore,
}

/// A collection owned by the library schema.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// Collection the module's documents live in
    fn collection(&self) -> &'static str;

    /// Indexes to create on the collection, in creation order
    fn indexes(&self) -> Vec<IndexSpec> {
        vec![]
    }

    /// Called once the collection and its indexes exist
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}
