#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use unwind::api::{ApiClient, CredentialProvider, StaticCredentials};
use unwind::kinds::SyncKind;
use unwind::network::{ConnectivityProbe, NetworkMonitor};
use unwind::storage::LocalStorage;
use unwind::sync::{SyncModule, SyncNotice};

/// Probe answering from a script first, then from a switch.
#[derive(Default)]
pub struct FakeProbe {
    script: Mutex<VecDeque<bool>>,
    online: AtomicBool,
    failing: AtomicBool,
}

impl FakeProbe {
    pub fn online(online: bool) -> Arc<Self> {
        let probe = Self::default();
        probe.online.store(online, Ordering::SeqCst);
        Arc::new(probe)
    }

    pub fn scripted(answers: &[bool]) -> Arc<Self> {
        let probe = Self::default();
        probe.script.lock().unwrap().extend(answers.iter().copied());
        Arc::new(probe)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityProbe for FakeProbe {
    async fn is_connected(&self) -> anyhow::Result<bool> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("network state unavailable");
        }
        if let Some(answer) = self.script.lock().unwrap().pop_front() {
            return Ok(answer);
        }
        Ok(self.online.load(Ordering::SeqCst))
    }
}

pub struct Harness<K: SyncKind> {
    pub storage: Arc<LocalStorage>,
    pub monitor: Arc<NetworkMonitor>,
    pub probe: Arc<FakeProbe>,
    pub module: Arc<SyncModule<K>>,
}

/// Module over a fresh in-memory store, talking to `base_url`.
pub async fn harness<K: SyncKind>(base_url: &str, token: Option<&str>, online: bool) -> Harness<K> {
    let storage = Arc::new(LocalStorage::open_in_memory().await.unwrap());
    let credentials: Arc<dyn CredentialProvider> = match token {
        Some(token) => Arc::new(StaticCredentials::new(token)),
        None => Arc::new(StaticCredentials::anonymous()),
    };
    let api = Arc::new(ApiClient::new(base_url, credentials));
    let probe = FakeProbe::online(online);
    let monitor = Arc::new(NetworkMonitor::with_initial_state(probe.clone(), online));
    let module = Arc::new(SyncModule::<K>::new(storage.clone(), api, monitor.clone()));

    Harness {
        storage,
        monitor,
        probe,
        module,
    }
}

/// Wait for the first notice matching `pred`, skipping others.
pub async fn next_notice<F>(rx: &mut broadcast::Receiver<SyncNotice>, pred: F) -> SyncNotice
where
    F: Fn(&SyncNotice) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let notice = rx.recv().await.unwrap();
            if pred(&notice) {
                return notice;
            }
        }
    })
    .await
    .expect("timed out waiting for a sync notice")
}
