//! Persistence layer: store contracts plus Postgres and in-memory backends.

pub mod memory;
pub mod models;
pub mod operations;
pub mod store;

pub use memory::MemoryStore;
pub use models::{Cat, CatChanges, CatSummary, NewCat, NewIdentity, UserIdentity, UserProfile};
pub use operations::DbOperations;
pub use store::{CatStore, CredentialStore, StoreResult};
