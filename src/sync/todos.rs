use super::{SyncError, SyncModule};
use crate::entities::{carried_over_todo, todo};
use crate::kinds::{TodoChanges, Todos};
use crate::utils::datetime::now_timestamp;

impl SyncModule<Todos> {
    /// Edit a todo locally, then send the new version to the backend if the
    /// todo is known there and the network is up.
    pub async fn update_todo(&self, local_id: i32, changes: TodoChanges) -> Result<todo::Model, SyncError> {
        changes.validate().map_err(SyncError::Invalid)?;

        if !changes.is_empty() {
            let update = changes.into_active_model(&now_timestamp());
            if !self.ctx.storage.update_fields::<Todos>(local_id, update).await? {
                return Err(SyncError::not_found::<Todos>(local_id));
            }
        }

        let row = self
            .ctx
            .storage
            .get::<Todos>(local_id)
            .await?
            .ok_or_else(|| SyncError::not_found::<Todos>(local_id))?;
        self.send_update(&row, &Todos::update_body(&row)).await;
        Ok(row)
    }

    /// Mark a todo done or not done. Same as [`SyncModule::set_flag`].
    pub async fn set_completed(&self, local_id: i32, completed: bool) -> Result<todo::Model, SyncError> {
        self.set_flag(local_id, completed).await
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<todo::Model>, SyncError> {
        Ok(self.ctx.storage.list_todos_by_category(category).await?)
    }

    /// Move one todo to the carried-over list.
    pub async fn carry_over(&self, task_id: i32) -> Result<carried_over_todo::Model, SyncError> {
        Ok(self.ctx.storage.carry_over(task_id).await?)
    }

    /// End-of-day cleanup: move every uncompleted todo to the carried-over list.
    pub async fn carry_over_all_pending(&self) -> Result<usize, SyncError> {
        Ok(self.ctx.storage.carry_over_all_pending().await?)
    }

    pub async fn list_carried_over(&self, category: &str) -> Result<Vec<carried_over_todo::Model>, SyncError> {
        Ok(self.ctx.storage.list_carried_over(category).await?)
    }
}
