//! Repository layer for database operations.
//!
//! Repositories are stateless structs whose methods take any
//! `ConnectionTrait`, so the same query runs on the shared connection or inside
//! a transaction. Entities stay pure data models.

pub mod syncable;
pub mod todo;

pub use syncable::SyncableRepository;
pub use todo::TodoRepository;
