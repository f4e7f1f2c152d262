use anyhow::Context;
use std::sync::Arc;

use library_db::IndexSpec;

use crate::module::{InitCtx, Module};

/// Module registry; modules are provisioned in registration order
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module with the registry
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    /// Get all registered modules
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// Get the number of registered modules
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Explicitly create each module's collection
    pub async fn create_collections(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(
                module = module.name(),
                collection = module.collection(),
                "creating collection"
            );

            ctx.store
                .create_collection(module.collection())
                .await
                .with_context(|| format!("failed to create collection '{}'", module.collection()))?;
        }

        Ok(())
    }

    /// Create every module's indexes, returning `(collection, index name)` pairs
    pub async fn create_indexes(&self, ctx: &InitCtx<'_>) -> anyhow::Result<Vec<(String, String)>> {
        let mut created = Vec::new();

        for (collection, index) in self.collect_indexes() {
            let name = ctx
                .store
                .create_index(collection, &index)
                .await
                .with_context(|| {
                    format!("failed to create index '{}' on '{}'", index.name(), collection)
                })?;

            tracing::info!(collection, index = %name, unique = index.unique, "index created");
            created.push((collection.to_string(), name));
        }

        Ok(created)
    }

    /// Run each module's init hook
    pub async fn init_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect all index definitions, grouped by module in registration order
    pub fn collect_indexes(&self) -> Vec<(&'static str, IndexSpec)> {
        self.modules
            .iter()
            .flat_map(|module| {
                module
                    .indexes()
                    .into_iter()
                    .map(move |index| (module.collection(), index))
            })
            .collect()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
