use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use thiserror::Error;

use crate::kinds::{Journal, Mistakes, Overthinking, SyncKind, Todos};

/// Failures of the local store. These are never retried automatically.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("local store is not ready: schema has not been created")]
    NotReady,

    #[error("{kind} record not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("storage path error: {0}")]
    Io(#[from] std::io::Error),
}

/// Owned handle to the journaling database.
///
/// Wraps one pooled SQLite connection. Every operation fails with
/// [`StoreError::NotReady`] until [`LocalStorage::init_schema`] has run.
pub struct LocalStorage {
    pub(crate) conn: DatabaseConnection,
    ready: AtomicBool,
}

impl LocalStorage {
    /// Open a connection without creating the schema.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let mut options = ConnectOptions::new(url.to_owned());
        // A single connection serializes writes and keeps in-memory databases alive.
        options.max_connections(1).min_connections(1).sqlx_logging(false);

        let conn = Database::connect(options).await?;
        debug!("Opened local store at {url}");

        Ok(Self {
            conn,
            ready: AtomicBool::new(false),
        })
    }

    /// Connect and create the schema.
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let storage = Self::connect(url).await?;
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Private database that disappears with the store.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    /// Open (creating if needed) a database file, including its parent directories.
    pub async fn open_path(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::open(&format!("sqlite://{}?mode=rwc", path.display())).await
    }

    /// Create every table and index. Safe to run more than once.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let statements = Journal::SCHEMA
            .iter()
            .chain(Mistakes::SCHEMA)
            .chain(Overthinking::SCHEMA)
            .chain(Todos::SCHEMA);

        for sql in statements {
            self.conn.execute_unprepared(sql).await?;
        }

        self.ready.store(true, Ordering::Release);
        info!("✅ Local store schema ready");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// The connection, once the schema exists.
    pub(crate) fn conn(&self) -> Result<&DatabaseConnection, StoreError> {
        if self.is_ready() {
            Ok(&self.conn)
        } else {
            Err(StoreError::NotReady)
        }
    }

    /// Health check.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.conn.execute_unprepared("SELECT 1").await?;
        Ok(())
    }

    /// Close the pool. Later calls fail with [`StoreError::NotReady`].
    pub async fn close(&self) -> Result<(), StoreError> {
        self.ready.store(false, Ordering::Release);
        self.conn.clone().close().await?;
        Ok(())
    }
}
