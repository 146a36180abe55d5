use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};

use unwind::api::{ApiClient, CredentialProvider, EnvCredentials};
use unwind::config::Config;
use unwind::constants::{DEFAULT_LATEST_LIMIT, WARN_NO_ID_TOKEN};
use unwind::kinds::{Journal, Mistakes, Overthinking, SyncKind, Todos};
use unwind::logger::setup_logger;
use unwind::network::{NetworkMonitor, TcpProbe};
use unwind::storage::LocalStorage;
use unwind::sync::{ReconciliationDriver, SyncModule};
use unwind::utils::datetime;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--init-config") {
        return Config::generate_default_config(Config::get_default_config_path()?);
    }

    let config = Config::load()?;
    let _logger = setup_logger(&config.logging)?;

    // Nothing works without the local store.
    let db_path = config.database_path()?;
    let storage = Arc::new(
        LocalStorage::open_path(&db_path)
            .await
            .with_context(|| format!("Failed to open local store at {}", db_path.display()))?,
    );
    info!("Local store at {}", db_path.display());

    let credentials = Arc::new(EnvCredentials::new(config.api.token_env.clone()));
    if credentials.id_token().await.is_none() {
        warn!("{} {}", WARN_NO_ID_TOKEN, credentials.var());
    }
    let api = Arc::new(ApiClient::new(config.api.base_url.clone(), credentials));

    let probe = TcpProbe::for_base_url(&config.api.base_url, config.network.probe_timeout())?;
    let monitor = Arc::new(NetworkMonitor::new(Arc::new(probe)));
    let polling = monitor.start_polling(config.network.poll_interval());

    let page_size = config.api.pull_page_size;
    let journal = Arc::new(SyncModule::<Journal>::with_page_size(
        Arc::clone(&storage),
        Arc::clone(&api),
        Arc::clone(&monitor),
        page_size,
    ));
    let mistakes = Arc::new(SyncModule::<Mistakes>::with_page_size(
        Arc::clone(&storage),
        Arc::clone(&api),
        Arc::clone(&monitor),
        page_size,
    ));
    let overthinking = Arc::new(SyncModule::<Overthinking>::with_page_size(
        Arc::clone(&storage),
        Arc::clone(&api),
        Arc::clone(&monitor),
        page_size,
    ));
    let todos = Arc::new(SyncModule::<Todos>::with_page_size(
        Arc::clone(&storage),
        Arc::clone(&api),
        Arc::clone(&monitor),
        page_size,
    ));

    let mut journal_driver = ReconciliationDriver::new(Arc::clone(&journal));
    let mut mistakes_driver = ReconciliationDriver::new(Arc::clone(&mistakes));
    let mut overthinking_driver = ReconciliationDriver::new(Arc::clone(&overthinking));
    let mut todos_driver = ReconciliationDriver::new(Arc::clone(&todos));

    journal_driver.mount().await?;
    mistakes_driver.mount().await?;
    overthinking_driver.mount().await?;
    todos_driver.mount().await?;

    if let Some(token) = api.credential().await {
        match api.profile(&token).await {
            Ok(profile) => {
                if let Some(email) = profile.user.and_then(|u| u.email) {
                    info!("Signed in as {email}");
                }
            }
            Err(e) => warn!("Could not load profile: {e}"),
        }
    }

    let today = datetime::format_today();
    info!(
        "{} journal entries today, {} unsynced, {} recent",
        journal.list_by_date(&today).await?.len(),
        journal.list_unsynced().await?.len(),
        journal.list_latest(DEFAULT_LATEST_LIMIT).await?.len()
    );
    info!("Running; press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }

    info!("Shutting down");
    polling.stop();
    journal_driver.unmount().await;
    mistakes_driver.unmount().await;
    overthinking_driver.unmount().await;
    todos_driver.unmount().await;

    journal.shutdown().await;
    mistakes.shutdown().await;
    overthinking.shutdown().await;
    todos.shutdown().await;

    let pending = journal.list_unsynced().await?.len()
        + mistakes.list_unsynced().await?.len()
        + overthinking.list_unsynced().await?.len()
        + todos.list_unsynced().await?.len();
    if pending > 0 {
        info!("{pending} records stay local until the next run with a connection");
    }
    info!("Stopped {} sync", [Journal::NAME, Mistakes::NAME, Overthinking::NAME, Todos::NAME].join(", "));

    storage.close().await?;
    Ok(())
}
