use log::{debug, info, warn};
use serde_json::Value;

use super::{SyncError, SyncModule};
use crate::constants::{LOG_ERROR_REMOTE_DELETE, LOG_ERROR_REMOTE_UPDATE};
use crate::kinds::{FlaggedKind, SyncKind};
use crate::storage::RecordKey;

impl<K: SyncKind> SyncModule<K> {
    /// Delete a record locally, then remove the server copy if possible.
    ///
    /// The local delete always happens. The remote delete is attempted only
    /// when the record has a server id, a fresh connectivity check says online
    /// and a credential exists; its failures are logged and swallowed.
    ///
    /// Returns the number of local rows removed.
    pub async fn delete(&self, key: impl Into<RecordKey>) -> Result<u64, SyncError> {
        let key = key.into();
        let server_id = match &key {
            RecordKey::Local(id) => self
                .ctx
                .storage
                .get::<K>(*id)
                .await?
                .and_then(|row| K::server_id(&row).map(str::to_owned)),
            RecordKey::Server(id) => Some(id.clone()),
        };

        let removed = self.ctx.storage.delete::<K>(&key).await?;
        info!("Deleted {} {} record(s) by {key}", removed, K::NAME);

        if let Some(server_id) = server_id {
            self.delete_remote(&server_id).await;
        }
        Ok(removed)
    }

    async fn delete_remote(&self, server_id: &str) {
        if !self.monitor.check_now().await {
            debug!("Offline; server copy of {} {server_id} not deleted", K::NAME);
            return;
        }
        let Some(token) = self.ctx.api.credential().await else {
            debug!("No credential; server copy of {} {server_id} not deleted", K::NAME);
            return;
        };
        if let Err(e) = self.ctx.api.delete::<K>(&token, server_id).await {
            warn!("{LOG_ERROR_REMOTE_DELETE} {} {server_id}: {e}", K::NAME);
        }
    }
}

impl<K: FlaggedKind> SyncModule<K> {
    /// Set the kind's status flag (avoided, dumped, completed) on one row.
    ///
    /// Kinds with a flag update body (todos) also `PUT` the new version when
    /// the row is known to the backend; that mirror is best-effort.
    pub async fn set_flag(&self, local_id: i32, value: bool) -> Result<K::Model, SyncError> {
        if !self.ctx.storage.set_flag::<K>(local_id, value).await? {
            return Err(SyncError::not_found::<K>(local_id));
        }
        debug!("Set {} {} = {value} on record {local_id}", K::NAME, K::FLAG_NAME);
        let row = self
            .ctx
            .storage
            .get::<K>(local_id)
            .await?
            .ok_or_else(|| SyncError::not_found::<K>(local_id))?;
        if let Some(body) = K::flag_update_body(&row) {
            self.send_update(&row, &body).await;
        }
        Ok(row)
    }
}

impl<K: SyncKind> SyncModule<K> {
    /// Best-effort `PUT` of an edited row that already has a server copy.
    pub(crate) async fn send_update(&self, row: &K::Model, body: &Value) {
        let Some(server_id) = K::server_id(row) else {
            return;
        };
        if !self.monitor.check_now().await {
            debug!("Offline; update of {} {server_id} stays local", K::NAME);
            return;
        }
        let Some(token) = self.ctx.api.credential().await else {
            return;
        };
        if let Err(e) = self.ctx.api.update::<K>(&token, server_id, body).await {
            warn!("{LOG_ERROR_REMOTE_UPDATE} {} {server_id}: {e}", K::NAME);
        }
    }
}
