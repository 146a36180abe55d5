//! Connectivity monitor.
//!
//! [`NetworkMonitor`] keeps a cached online estimate, refreshes it from a
//! [`ConnectivityProbe`] on demand or on a polling timer, and notifies
//! listeners only when the estimate flips.

pub mod probe;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub use probe::{ConnectivityProbe, TcpProbe};

/// Callback receiving the new online state.
pub type Listener = Arc<dyn Fn(bool) + Send + Sync>;

type ListenerList = Mutex<Vec<(u64, Listener)>>;

pub struct NetworkMonitor {
    probe: Arc<dyn ConnectivityProbe>,
    online: AtomicBool,
    check_lock: tokio::sync::Mutex<()>,
    listeners: Arc<ListenerList>,
    next_listener_id: AtomicU64,
}

impl NetworkMonitor {
    /// Monitor that assumes it is online until the first check says otherwise.
    pub fn new(probe: Arc<dyn ConnectivityProbe>) -> Self {
        Self::with_initial_state(probe, true)
    }

    pub fn with_initial_state(probe: Arc<dyn ConnectivityProbe>, online: bool) -> Self {
        Self {
            probe,
            online: AtomicBool::new(online),
            check_lock: tokio::sync::Mutex::new(()),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Last observed state, without querying the probe.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Query the probe once and update the cached state.
    ///
    /// Listeners run synchronously, in subscription order, when the state
    /// differs from the previous observation. A probe failure counts as offline.
    pub async fn check_now(&self) -> bool {
        let _serialized = self.check_lock.lock().await;

        let online = match self.probe.is_connected().await {
            Ok(connected) => connected,
            Err(e) => {
                warn!("Connectivity check failed: {e:#}");
                false
            }
        };

        let previous = self.online.swap(online, Ordering::AcqRel);
        if previous != online {
            info!("{}", if online { "🌐 Network is back online" } else { "📴 Network went offline" });
            self.notify(online);
        }
        online
    }

    fn notify(&self, online: bool) {
        // Snapshot so a listener may subscribe or unsubscribe without deadlocking.
        let listeners: Vec<Listener> = if let Ok(list) = self.listeners.lock() {
            list.iter().map(|(_, l)| Arc::clone(l)).collect()
        } else {
            Vec::new()
        };
        for listener in listeners {
            listener(online);
        }
    }

    /// Register a listener for state transitions.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(listener);
        if let Ok(mut list) = self.listeners.lock() {
            list.push((id, listener));
        }
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|list| list.len()).unwrap_or(0)
    }

    /// Check immediately, then every `interval`, until the handle is stopped or dropped.
    pub fn start_polling(self: &Arc<Self>, interval: Duration) -> PollingHandle {
        let monitor = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                monitor.check_now().await;
            }
        });
        PollingHandle { task }
    }
}

/// Registration returned by [`NetworkMonitor::subscribe`].
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe() to remove it"]
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerList>,
}

impl Subscription {
    /// Remove the listener. Later transitions are not delivered.
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            if let Ok(mut list) = listeners.lock() {
                list.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

/// Running poll loop. Dropping the handle stops polling.
pub struct PollingHandle {
    task: JoinHandle<()>,
}

impl PollingHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
