use std::fmt;

use sea_orm::TransactionTrait;

use super::{LocalStorage, StoreError};
use crate::kinds::{FlaggedKind, SyncKind};
use crate::repositories::SyncableRepository;
use crate::utils::datetime::now_timestamp;

/// Identifies a row either by its local id or by its backend id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Local(i32),
    Server(String),
}

impl RecordKey {
    /// Build a key from whichever ids are known. The local id wins when both are.
    pub fn from_ids(local_id: Option<i32>, server_id: Option<String>) -> Option<Self> {
        match (local_id, server_id) {
            (Some(id), _) => Some(Self::Local(id)),
            (None, Some(server_id)) => Some(Self::Server(server_id)),
            (None, None) => None,
        }
    }
}

impl From<i32> for RecordKey {
    fn from(local_id: i32) -> Self {
        Self::Local(local_id)
    }
}

impl From<&str> for RecordKey {
    fn from(server_id: &str) -> Self {
        Self::Server(server_id.to_owned())
    }
}

impl From<String> for RecordKey {
    fn from(server_id: String) -> Self {
        Self::Server(server_id)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(id) => write!(f, "local id {id}"),
            Self::Server(id) => write!(f, "server id {id}"),
        }
    }
}

impl LocalStorage {
    /// Store a new unsynced row for `draft`, stamped with the current time.
    pub async fn insert_local<K: SyncKind>(&self, draft: &K::Draft) -> Result<K::Model, StoreError> {
        self.insert_local_at::<K>(draft, &now_timestamp()).await
    }

    /// Store a new unsynced row for `draft` with an explicit timestamp.
    pub async fn insert_local_at<K: SyncKind>(&self, draft: &K::Draft, timestamp: &str) -> Result<K::Model, StoreError> {
        let row = K::local_row(draft, timestamp);
        Ok(SyncableRepository::<K>::insert(self.conn()?, row).await?)
    }

    pub async fn get<K: SyncKind>(&self, local_id: i32) -> Result<Option<K::Model>, StoreError> {
        Ok(SyncableRepository::<K>::get_by_id(self.conn()?, local_id).await?)
    }

    pub async fn get_by_server_id<K: SyncKind>(&self, server_id: &str) -> Result<Option<K::Model>, StoreError> {
        Ok(SyncableRepository::<K>::get_by_server_id(self.conn()?, server_id).await?)
    }

    /// Rows for one day, in chronological order.
    pub async fn list_by_date<K: SyncKind>(&self, date: &str) -> Result<Vec<K::Model>, StoreError> {
        Ok(SyncableRepository::<K>::list_by_date(self.conn()?, date).await?)
    }

    /// The `limit` most recent rows, newest first.
    pub async fn list_latest<K: SyncKind>(&self, limit: u64) -> Result<Vec<K::Model>, StoreError> {
        Ok(SyncableRepository::<K>::list_latest(self.conn()?, limit).await?)
    }

    pub async fn list_unsynced<K: SyncKind>(&self) -> Result<Vec<K::Model>, StoreError> {
        Ok(SyncableRepository::<K>::list_unsynced(self.conn()?).await?)
    }

    /// Partial update of one row. Returns whether a row was changed.
    pub async fn update_fields<K: SyncKind>(&self, local_id: i32, changes: K::ActiveModel) -> Result<bool, StoreError> {
        let affected = SyncableRepository::<K>::update_fields(self.conn()?, local_id, changes).await?;
        Ok(affected > 0)
    }

    /// Attach the backend id to a pushed row and flag it synced.
    ///
    /// Returns `false` if the row was deleted while the push was in flight.
    pub async fn mark_synced<K: SyncKind>(
        &self,
        local_id: i32,
        server_id: &str,
        timestamp: Option<&str>,
    ) -> Result<bool, StoreError> {
        let affected = SyncableRepository::<K>::mark_synced(self.conn()?, local_id, server_id, timestamp).await?;
        Ok(affected > 0)
    }

    /// Set the status flag of a row. Returns whether a row was changed.
    pub async fn set_flag<K: FlaggedKind>(&self, local_id: i32, value: bool) -> Result<bool, StoreError> {
        let stamp = K::FLAG_RESTAMPS.then(now_timestamp);
        let affected = SyncableRepository::<K>::set_flag(self.conn()?, local_id, value, stamp.as_deref()).await?;
        Ok(affected > 0)
    }

    /// Insert or update a server record, keyed strictly on its server id.
    ///
    /// Returns the local id of the row holding the record.
    pub async fn upsert_from_server<K: SyncKind>(&self, remote: &K::Remote) -> Result<i32, StoreError> {
        let server_id = K::remote_id(remote);
        let txn = self.conn()?.begin().await?;

        let local_id = match SyncableRepository::<K>::get_by_server_id(&txn, server_id).await? {
            Some(existing) => {
                SyncableRepository::<K>::update_by_server_id(&txn, server_id, K::remote_row(remote)).await?;
                K::local_id(&existing)
            }
            None => {
                let inserted = SyncableRepository::<K>::insert(&txn, K::remote_row(remote)).await?;
                K::local_id(&inserted)
            }
        };

        txn.commit().await?;
        Ok(local_id)
    }

    /// Delete by local id or server id. Returns the number of rows removed.
    pub async fn delete<K: SyncKind>(&self, key: &RecordKey) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let removed = match key {
            RecordKey::Local(id) => SyncableRepository::<K>::delete_by_id(conn, *id).await?,
            RecordKey::Server(id) => SyncableRepository::<K>::delete_by_server_id(conn, id).await?,
        };
        Ok(removed)
    }
}
