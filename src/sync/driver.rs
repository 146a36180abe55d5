//! Screen-level reconciliation: pull once on mount, resync on every reconnect.

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{SyncError, SyncModule};
use crate::kinds::SyncKind;
use crate::network::Subscription;
use crate::storage::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Store not ready yet, or the driver is unmounted.
    Cold,
    /// Initial pull done and listening for reconnects.
    Ready,
}

/// Keeps one kind in step with the backend while a screen is mounted.
///
/// Reconnect events are forwarded from the monitor's listener to a worker
/// task, which runs one bulk resync at a time. This is the only automatic
/// retry of failed pushes.
pub struct ReconciliationDriver<K: SyncKind> {
    module: Arc<SyncModule<K>>,
    state: DriverState,
    subscription: Option<Subscription>,
    worker: Option<JoinHandle<()>>,
}

impl<K: SyncKind> ReconciliationDriver<K> {
    pub fn new(module: Arc<SyncModule<K>>) -> Self {
        Self {
            module,
            state: DriverState::Cold,
            subscription: None,
            worker: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn module(&self) -> &Arc<SyncModule<K>> {
        &self.module
    }

    /// Enter `Ready`: pull once, then start reacting to reconnects.
    ///
    /// Returns the number of records pulled. Network and credential failures
    /// of the pull are logged and ignored. Mounting twice is a no-op.
    ///
    /// # Errors
    /// [`StoreError::NotReady`] while the schema does not exist yet (the
    /// driver stays `Cold`), or any store failure during the pull.
    pub async fn mount(&mut self) -> Result<usize, StoreError> {
        if self.state == DriverState::Ready {
            return Ok(0);
        }
        if !self.module.storage().is_ready() {
            return Err(StoreError::NotReady);
        }
        self.state = DriverState::Ready;

        let pulled = match self.module.pull().await {
            Ok(count) => count,
            Err(SyncError::Store(e)) => {
                self.state = DriverState::Cold;
                return Err(e);
            }
            Err(e) => {
                warn!("Initial {} pull skipped: {e}", K::NAME);
                0
            }
        };

        let (reconnects, mut rx) = mpsc::unbounded_channel::<()>();
        self.subscription = Some(self.module.monitor().subscribe(move |online| {
            if online {
                let _ = reconnects.send(());
            }
        }));

        let module = Arc::clone(&self.module);
        self.worker = Some(tokio::spawn(async move {
            while rx.recv().await.is_some() {
                // Reconnects queued during a resync are covered by the next one.
                while rx.try_recv().is_ok() {}
                match module.resync_pending().await {
                    Ok(report) => debug!("{} resync after reconnect: {report:?}", K::NAME),
                    Err(e) => error!("❌ {} resync after reconnect failed: {e}", K::NAME),
                }
            }
        }));

        info!("{} driver ready ({pulled} records pulled)", K::NAME);
        Ok(pulled)
    }

    /// Stop reacting to reconnects and return to `Cold`.
    ///
    /// A resync already running is allowed to finish before this returns.
    pub async fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(worker) = self.worker.take() {
            // The channel closes with the listener, so the worker exits after its current run.
            if let Err(e) = worker.await {
                if e.is_panic() {
                    error!("{} reconciliation worker panicked: {e}", K::NAME);
                }
            }
        }
        self.state = DriverState::Cold;
    }
}

impl<K: SyncKind> Drop for ReconciliationDriver<K> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
