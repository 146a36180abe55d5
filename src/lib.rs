//! Unwind - offline-first sync core for a personal journaling app
//!
//! Journal entries, mistakes, overthinking notes and todos are written to a
//! local SQLite store first and reconciled with a REST backend whenever a
//! network connection and a signed-in user are available.
//!
//! # Modules
//!
//! * [`config`] - Application configuration management
//! * [`storage`] - Local database and data persistence
//! * [`network`] - Connectivity monitoring
//! * [`api`] - REST client for the journaling backend
//! * [`sync`] - Push, pull and reconnect reconciliation
//! * [`kinds`] - Descriptors of the syncable entity kinds
//! * [`utils`] - Utility functions and helpers

/// REST client and credential providers
pub mod api;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Entity kind descriptors shared by storage, API and sync
pub mod kinds;

/// Logging setup and in-memory log buffer
pub mod logger;

/// Connectivity monitor
pub mod network;

/// Repository layer for database operations
pub mod repositories;

/// Local storage layer
pub mod storage;

/// Synchronization engine for keeping local and remote data in sync
pub mod sync;

/// Utility functions for date/time handling
pub mod utils;

// Re-export entity models and kinds for convenient access
pub use entities::{carried_over_todo, journal, mistake, overthinking, todo};
pub use kinds::{Journal, Mistakes, Overthinking, SyncKind, Todos};
