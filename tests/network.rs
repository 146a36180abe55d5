mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::FakeProbe;
use unwind::network::{NetworkMonitor, TcpProbe};

fn recorder() -> (Arc<Mutex<Vec<bool>>>, impl Fn(bool) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |online| sink.lock().unwrap().push(online))
}

#[tokio::test]
async fn test_listeners_fire_only_on_transitions() {
    let monitor = NetworkMonitor::with_initial_state(FakeProbe::scripted(&[true, true, false, false, true]), true);
    let (seen, listener) = recorder();
    let _subscription = monitor.subscribe(listener);

    let mut results = Vec::new();
    for _ in 0..5 {
        results.push(monitor.check_now().await);
    }

    assert_eq!(results, [true, true, false, false, true]);
    assert_eq!(*seen.lock().unwrap(), [false, true]);
    assert!(monitor.is_online());
}

#[tokio::test]
async fn test_probe_failure_counts_as_offline() {
    let probe = FakeProbe::online(true);
    let monitor = NetworkMonitor::new(probe.clone());
    let (seen, listener) = recorder();
    let _subscription = monitor.subscribe(listener);

    probe.set_failing(true);
    assert!(!monitor.check_now().await);
    assert!(!monitor.is_online());

    probe.set_failing(false);
    assert!(monitor.check_now().await);
    assert_eq!(*seen.lock().unwrap(), [false, true]);
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let probe = FakeProbe::online(false);
    let monitor = NetworkMonitor::with_initial_state(probe.clone(), true);
    let (first_seen, first) = recorder();
    let (second_seen, second) = recorder();
    let first_sub = monitor.subscribe(first);
    let _second_sub = monitor.subscribe(second);
    assert_eq!(monitor.listener_count(), 2);

    monitor.check_now().await;
    first_sub.unsubscribe();
    assert_eq!(monitor.listener_count(), 1);

    probe.set_online(true);
    monitor.check_now().await;

    assert_eq!(*first_seen.lock().unwrap(), [false]);
    assert_eq!(*second_seen.lock().unwrap(), [false, true]);
}

#[tokio::test]
async fn test_polling_checks_immediately_and_stops() {
    let probe = FakeProbe::online(true);
    let monitor = Arc::new(NetworkMonitor::with_initial_state(probe.clone(), false));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _subscription = monitor.subscribe(move |online| {
        let _ = tx.send(online);
    });

    let handle = monitor.start_polling(Duration::from_millis(20));
    assert!(handle.is_running());

    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    assert_eq!(first, Some(true));

    probe.set_online(false);
    let second = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    assert_eq!(second, Some(false));

    handle.stop();
    probe.set_online(true);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!monitor.is_online());
}

#[tokio::test]
async fn test_tcp_probe_reads_host_and_port_from_url() {
    assert!(TcpProbe::for_base_url("http://localhost:5000", Duration::from_millis(200)).is_ok());
    assert!(TcpProbe::for_base_url("https://api.example.com", Duration::from_millis(200)).is_ok());
    assert!(TcpProbe::for_base_url("not a url", Duration::from_millis(200)).is_err());
}

#[tokio::test]
async fn test_tcp_probe_reports_reachability() {
    use unwind::network::ConnectivityProbe;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let probe = TcpProbe::new("127.0.0.1", port, Duration::from_millis(500));
    assert!(probe.is_connected().await.unwrap());

    drop(listener);
    let probe = TcpProbe::new("127.0.0.1", port, Duration::from_millis(500));
    assert!(!probe.is_connected().await.unwrap_or(false));
}
