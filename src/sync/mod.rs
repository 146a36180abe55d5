//! Offline-first synchronization of journaling records.
//!
//! A [`SyncModule`] is written once and instantiated per entity kind
//! (`SyncModule<Journal>`, `SyncModule<Todos>`, ...). It owns the write path:
//! every record is stored locally first and pushed to the backend afterwards,
//! either right away in a background task, on demand, or in bulk when the
//! network comes back.
//!
//! Background pushes live in a task set owned by the module so that shutdown
//! can wait for them ([`SyncModule::shutdown`]) or cancel them
//! ([`SyncModule::abort_pending`]). Outcomes the user should hear about are
//! broadcast as [`SyncNotice`]s.
//!
//! # Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use unwind::api::{ApiClient, StaticCredentials};
//! use unwind::kinds::{Journal, JournalDraft};
//! use unwind::network::{NetworkMonitor, TcpProbe};
//! use unwind::storage::LocalStorage;
//! use unwind::sync::SyncModule;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let storage = Arc::new(LocalStorage::open_in_memory().await?);
//! let api = Arc::new(ApiClient::new("http://localhost:5000", Arc::new(StaticCredentials::new("token"))));
//! let probe = TcpProbe::for_base_url("http://localhost:5000", Duration::from_millis(500))?;
//! let monitor = Arc::new(NetworkMonitor::new(Arc::new(probe)));
//!
//! let journal = SyncModule::<Journal>::new(storage, api, monitor);
//! let row = journal.create(JournalDraft::new("2024-01-01", "Slept well")).await?;
//! journal.shutdown().await;
//! # let _ = row;
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod local;
pub mod pull;
pub mod push;
pub mod todos;

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use log::{error, warn};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinSet;

use crate::api::{ApiClient, ApiError};
use crate::constants::{
    DEFAULT_PULL_PAGE_SIZE, NOTICE_PUSH_FAILED, NOTICE_RESYNCED, NOTICE_SAVED_OFFLINE, NOTICE_SYNCED,
};
use crate::kinds::SyncKind;
use crate::network::NetworkMonitor;
use crate::storage::{LocalStorage, StoreError};

pub use driver::{DriverState, ReconciliationDriver};

const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no network connection")]
    NoNetwork,

    #[error("authentication required")]
    AuthRequired,

    #[error("{kind} record {local_id} is already being synced")]
    PushInFlight { kind: &'static str, local_id: i32 },

    #[error("{kind} record not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("invalid entry: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SyncError {
    fn not_found<K: SyncKind>(local_id: i32) -> Self {
        Self::NotFound {
            kind: K::NAME,
            key: local_id.to_string(),
        }
    }
}

/// Outcome of a bulk resync.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResyncReport {
    /// Unsynced rows found when the resync started.
    pub pending: usize,
    pub synced: usize,
    pub failed: usize,
    /// Rows left alone: already being pushed, deleted meanwhile, or no credential.
    pub skipped: usize,
}

/// User-facing sync event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncNotice {
    SavedOffline { kind: &'static str, local_id: i32 },
    Synced { kind: &'static str, local_id: i32, server_id: String },
    PushFailed { kind: &'static str, local_id: i32, message: String },
    Resynced { kind: &'static str, report: ResyncReport },
}

impl fmt::Display for SyncNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SavedOffline { kind, .. } => write!(f, "{NOTICE_SAVED_OFFLINE} ({kind})"),
            Self::Synced { kind, .. } => write!(f, "{NOTICE_SYNCED} ({kind})"),
            Self::PushFailed { kind, message, .. } => write!(f, "{NOTICE_PUSH_FAILED} ({kind}): {message}"),
            Self::Resynced { kind, report } => write!(
                f,
                "{NOTICE_RESYNCED} {} of {} {kind} records",
                report.synced, report.pending
            ),
        }
    }
}

/// State shared between a module and its background pushes.
pub(crate) struct SyncContext {
    pub(crate) storage: Arc<LocalStorage>,
    pub(crate) api: Arc<ApiClient>,
    notices: broadcast::Sender<SyncNotice>,
    in_flight: Mutex<HashSet<i32>>,
}

impl SyncContext {
    pub(crate) fn notify(&self, notice: SyncNotice) {
        // No receivers is fine.
        let _ = self.notices.send(notice);
    }

    /// Claim a row for pushing. `None` if another push holds it.
    pub(crate) fn claim(&self, local_id: i32) -> Option<InFlightGuard<'_>> {
        let mut rows = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if rows.insert(local_id) {
            Some(InFlightGuard { ctx: self, local_id })
        } else {
            None
        }
    }
}

/// Releases a claimed row when dropped.
pub(crate) struct InFlightGuard<'a> {
    ctx: &'a SyncContext,
    local_id: i32,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut rows = self.ctx.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        rows.remove(&self.local_id);
    }
}

/// Sync operations for one entity kind.
pub struct SyncModule<K: SyncKind> {
    pub(crate) ctx: Arc<SyncContext>,
    pub(crate) monitor: Arc<NetworkMonitor>,
    pending: Mutex<JoinSet<()>>,
    page_size: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K: SyncKind> SyncModule<K> {
    pub fn new(storage: Arc<LocalStorage>, api: Arc<ApiClient>, monitor: Arc<NetworkMonitor>) -> Self {
        Self::with_page_size(storage, api, monitor, DEFAULT_PULL_PAGE_SIZE)
    }

    /// Module whose pulls fetch `page_size` records.
    pub fn with_page_size(
        storage: Arc<LocalStorage>,
        api: Arc<ApiClient>,
        monitor: Arc<NetworkMonitor>,
        page_size: u32,
    ) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            ctx: Arc::new(SyncContext {
                storage,
                api,
                notices,
                in_flight: Mutex::new(HashSet::new()),
            }),
            monitor,
            pending: Mutex::new(JoinSet::new()),
            page_size,
            _kind: PhantomData,
        }
    }

    pub fn storage(&self) -> &Arc<LocalStorage> {
        &self.ctx.storage
    }

    pub fn monitor(&self) -> &Arc<NetworkMonitor> {
        &self.monitor
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Receive notices emitted from now on.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<SyncNotice> {
        self.ctx.notices.subscribe()
    }

    pub async fn get(&self, local_id: i32) -> Result<Option<K::Model>, SyncError> {
        Ok(self.ctx.storage.get::<K>(local_id).await?)
    }

    pub async fn list_latest(&self, limit: u64) -> Result<Vec<K::Model>, SyncError> {
        Ok(self.ctx.storage.list_latest::<K>(limit).await?)
    }

    pub async fn list_by_date(&self, date: &str) -> Result<Vec<K::Model>, SyncError> {
        Ok(self.ctx.storage.list_by_date::<K>(date).await?)
    }

    pub async fn list_unsynced(&self) -> Result<Vec<K::Model>, SyncError> {
        Ok(self.ctx.storage.list_unsynced::<K>().await?)
    }

    /// Number of background pushes that have not finished yet.
    pub fn pending_pushes(&self) -> usize {
        match self.pending.lock() {
            Ok(mut set) => {
                while set.try_join_next().is_some() {}
                set.len()
            }
            Err(_) => 0,
        }
    }

    pub(crate) fn spawn_background<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match self.pending.lock() {
            Ok(mut set) => {
                // Reap finished pushes so the set does not grow without bound.
                while set.try_join_next().is_some() {}
                set.spawn(task);
            }
            Err(_) => warn!("Background task set for {} is unavailable; push skipped", K::NAME),
        }
    }

    /// Wait for every background push to finish.
    pub async fn shutdown(&self) {
        let mut set = match self.pending.lock() {
            Ok(mut set) => std::mem::take(&mut *set),
            Err(_) => return,
        };
        while let Some(result) = set.join_next().await {
            if let Err(e) = result {
                if e.is_panic() {
                    error!("Background push for {} panicked: {e}", K::NAME);
                }
            }
        }
    }

    /// Cancel every background push. Cancelled rows stay unsynced.
    pub fn abort_pending(&self) {
        if let Ok(mut set) = self.pending.lock() {
            set.abort_all();
        }
    }
}
