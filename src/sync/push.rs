use std::sync::Arc;

use log::{debug, info, warn};

use super::{ResyncReport, SyncContext, SyncError, SyncModule, SyncNotice};
use crate::constants::LOG_ERROR_PUSH;
use crate::kinds::SyncKind;

impl SyncContext {
    /// Push one row and record its backend id.
    ///
    /// The row is re-read after it has been claimed, so a row synced by a
    /// concurrent push is returned as-is instead of being created twice.
    pub(crate) async fn push_row<K: SyncKind>(&self, token: &str, local_id: i32) -> Result<K::Model, SyncError> {
        let _claim = self.claim(local_id).ok_or(SyncError::PushInFlight {
            kind: K::NAME,
            local_id,
        })?;

        let row = self
            .storage
            .get::<K>(local_id)
            .await?
            .ok_or_else(|| SyncError::not_found::<K>(local_id))?;
        if K::is_synced(&row) {
            return Ok(row);
        }

        let created = self.api.create::<K>(token, &row).await?;
        let marked = self
            .storage
            .mark_synced::<K>(local_id, &created.id, created.created_at.as_deref())
            .await?;
        if !marked {
            // Deleted locally while the request was in flight.
            warn!("{} record {local_id} was deleted during push; server copy {} kept", K::NAME, created.id);
            return Err(SyncError::not_found::<K>(local_id));
        }

        debug!("Pushed {} record {local_id} as {}", K::NAME, created.id);
        self.storage
            .get::<K>(local_id)
            .await?
            .ok_or_else(|| SyncError::not_found::<K>(local_id))
    }

    /// Fire-and-forget push started right after a local create.
    async fn background_push<K: SyncKind>(&self, local_id: i32) {
        let Some(token) = self.api.credential().await else {
            debug!("No credential; {} record {local_id} stays local for now", K::NAME);
            return;
        };

        match self.push_row::<K>(&token, local_id).await {
            Ok(row) => {
                if let Some(server_id) = K::server_id(&row) {
                    self.notify(SyncNotice::Synced {
                        kind: K::NAME,
                        local_id,
                        server_id: server_id.to_owned(),
                    });
                }
            }
            Err(SyncError::PushInFlight { .. }) => {}
            Err(e) => {
                warn!("{LOG_ERROR_PUSH} {} record {local_id}: {e}", K::NAME);
                self.notify(SyncNotice::PushFailed {
                    kind: K::NAME,
                    local_id,
                    message: e.to_string(),
                });
            }
        }
    }
}

impl<K: SyncKind> SyncModule<K> {
    /// Stores a new record locally and pushes it in the background.
    ///
    /// The row is returned as soon as it is stored; this never waits on the
    /// network. The push only starts when the monitor's last estimate is
    /// online, otherwise a [`SyncNotice::SavedOffline`] is broadcast and the
    /// row waits for the next resync.
    ///
    /// # Errors
    /// [`SyncError::Invalid`] for a draft that fails validation, and
    /// [`SyncError::Store`] if the local write fails.
    pub async fn create(&self, draft: K::Draft) -> Result<K::Model, SyncError> {
        K::validate(&draft).map_err(SyncError::Invalid)?;

        let row = self.ctx.storage.insert_local::<K>(&draft).await?;
        let local_id = K::local_id(&row);
        info!("Saved {} record {local_id} locally", K::NAME);

        if self.monitor.is_online() {
            let ctx = Arc::clone(&self.ctx);
            self.spawn_background(async move {
                ctx.background_push::<K>(local_id).await;
            });
        } else {
            self.ctx.notify(SyncNotice::SavedOffline { kind: K::NAME, local_id });
        }

        Ok(row)
    }

    /// Pushes one row now, on the user's request.
    ///
    /// Connectivity is re-checked first, then the credential. A row that is
    /// already synced is returned unchanged.
    ///
    /// # Errors
    /// [`SyncError::NoNetwork`] when offline, [`SyncError::AuthRequired`]
    /// without a credential, [`SyncError::PushInFlight`] while a background
    /// push holds the row, and [`SyncError::Api`] for a rejected request.
    pub async fn sync_now(&self, local_id: i32) -> Result<K::Model, SyncError> {
        if !self.monitor.check_now().await {
            return Err(SyncError::NoNetwork);
        }
        let token = self.ctx.api.credential().await.ok_or(SyncError::AuthRequired)?;

        let row = self
            .ctx
            .storage
            .get::<K>(local_id)
            .await?
            .ok_or_else(|| SyncError::not_found::<K>(local_id))?;
        if K::is_synced(&row) {
            return Ok(row);
        }

        let row = self.ctx.push_row::<K>(&token, local_id).await?;
        if let Some(server_id) = K::server_id(&row) {
            self.ctx.notify(SyncNotice::Synced {
                kind: K::NAME,
                local_id,
                server_id: server_id.to_owned(),
            });
        }
        Ok(row)
    }

    /// Pushes every unsynced row, one at a time.
    ///
    /// A failing row does not stop the others. Without a credential nothing is
    /// pushed and every row is reported as skipped. Local store failures abort
    /// the run and propagate.
    pub async fn resync_pending(&self) -> Result<ResyncReport, SyncError> {
        let rows = self.ctx.storage.list_unsynced::<K>().await?;
        let mut report = ResyncReport {
            pending: rows.len(),
            ..ResyncReport::default()
        };
        if rows.is_empty() {
            return Ok(report);
        }

        let Some(token) = self.ctx.api.credential().await else {
            debug!("No credential; {} unsynced {} records left for later", rows.len(), K::NAME);
            report.skipped = rows.len();
            return Ok(report);
        };

        for row in &rows {
            let local_id = K::local_id(row);
            match self.ctx.push_row::<K>(&token, local_id).await {
                Ok(_) => report.synced += 1,
                Err(SyncError::Store(e)) => return Err(e.into()),
                Err(SyncError::PushInFlight { .. } | SyncError::NotFound { .. }) => report.skipped += 1,
                Err(e) => {
                    warn!("{LOG_ERROR_PUSH} {} record {local_id}: {e}", K::NAME);
                    report.failed += 1;
                }
            }
        }

        info!(
            "🔄 Resynced {}/{} {} records ({} failed, {} skipped)",
            report.synced, report.pending, K::NAME, report.failed, report.skipped
        );
        self.ctx.notify(SyncNotice::Resynced { kind: K::NAME, report });
        Ok(report)
    }
}
