use log::{debug, info, warn};

use super::{SyncError, SyncModule};
use crate::api::ListQuery;
use crate::constants::LOG_ERROR_PULL;
use crate::kinds::SyncKind;

impl<K: SyncKind> SyncModule<K> {
    /// Fetch the first page of server records and upsert them by server id.
    ///
    /// Returns the number of records stored; 0 when nobody is signed in.
    pub async fn pull(&self) -> Result<usize, SyncError> {
        self.pull_page(ListQuery::first_page(self.page_size())).await
    }

    /// Like [`pull`](Self::pull), restricted to one value of the kind's list
    /// filter (a date, or a todo category).
    pub async fn pull_filtered(&self, filter: &str) -> Result<usize, SyncError> {
        self.pull_page(ListQuery::first_page(self.page_size()).with_filter(filter))
            .await
    }

    async fn pull_page(&self, query: ListQuery) -> Result<usize, SyncError> {
        let Some(token) = self.ctx.api.credential().await else {
            debug!("No credential; skipping {} pull", K::NAME);
            return Ok(0);
        };

        let records = self
            .ctx
            .api
            .list::<K>(&token, &query)
            .await
            .inspect_err(|e| warn!("{LOG_ERROR_PULL} {}: {e}", K::NAME))?;

        for record in &records {
            self.ctx.storage.upsert_from_server::<K>(record).await?;
        }

        info!("✅ Pulled {} {} records from API", records.len(), K::NAME);
        Ok(records.len())
    }
}
