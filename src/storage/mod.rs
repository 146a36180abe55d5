//! Local storage for journaling data.
//!
//! One owned [`LocalStorage`] per process, built explicitly and shared through
//! `Arc`. Operations are split by concern:
//! - `records`: generic operations over every syncable kind
//! - `todos`: category views and the carried-over transaction

pub mod db;
pub mod records;
pub mod todos;

pub use db::{LocalStorage, StoreError};
pub use records::RecordKey;
