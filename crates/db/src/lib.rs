//! Storage layer for the library database: a backend-neutral store trait,
//! index definitions, the MongoDB client and an in-memory engine.

pub mod error;
pub mod index;
pub mod memory;
pub mod mongo;
pub mod store;

pub use error::StoreError;
pub use index::{IndexKind, IndexSpec};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use store::{connect, Backend, LibraryStore, ScoredDocument};
