pub mod books;
pub mod loans;
pub mod members;

use library_kernel::ModuleRegistry;

/// Register the library collections in provisioning order
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register(books::create_module());
    registry.register(members::create_module());
    registry.register(loans::create_module());
}

/// Registry holding every library collection
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry);
    registry
}
