use log::info;
use sea_orm::TransactionTrait;

use super::{LocalStorage, StoreError};
use crate::entities::{carried_over_todo, todo};
use crate::kinds::{SyncKind, Todos};
use crate::repositories::TodoRepository;
use crate::utils::datetime::now_timestamp;

impl LocalStorage {
    /// Todos in one category, newest first.
    pub async fn list_todos_by_category(&self, category: &str) -> Result<Vec<todo::Model>, StoreError> {
        Ok(TodoRepository::list_by_category(self.conn()?, category).await?)
    }

    /// Carried-over todos in one category, most recently carried first.
    pub async fn list_carried_over(&self, category: &str) -> Result<Vec<carried_over_todo::Model>, StoreError> {
        Ok(TodoRepository::list_carried_over_by_category(self.conn()?, category).await?)
    }

    /// Move one todo into the carried-over table.
    ///
    /// The copy and the delete commit together or not at all.
    pub async fn carry_over(&self, task_id: i32) -> Result<carried_over_todo::Model, StoreError> {
        let now = now_timestamp();
        let txn = self.conn()?.begin().await?;

        let Some(moved) = TodoRepository::carry_over(&txn, task_id, &now).await? else {
            txn.rollback().await?;
            return Err(StoreError::NotFound {
                kind: Todos::NAME,
                key: task_id.to_string(),
            });
        };

        txn.commit().await?;
        info!("Moved todo {task_id} to carried over as {}", moved.id);
        Ok(moved)
    }

    /// Move every uncompleted todo into the carried-over table in one transaction.
    ///
    /// Returns how many todos were moved.
    pub async fn carry_over_all_pending(&self) -> Result<usize, StoreError> {
        let now = now_timestamp();
        let txn = self.conn()?.begin().await?;

        let pending = TodoRepository::list_pending(&txn).await?;
        let mut moved = 0;
        for task in &pending {
            if TodoRepository::carry_over(&txn, task.id, &now).await?.is_some() {
                moved += 1;
            }
        }

        txn.commit().await?;
        info!("Carried over {moved} pending todos");
        Ok(moved)
    }
}
