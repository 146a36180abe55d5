//! Local-only holding table for todos that were not finished by the end of the day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carried_over_todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Local id of the todo this row was moved from. The source row no longer exists.
    pub original_task_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: String,
    pub completed: bool,
    pub due_date: Option<String>,
    pub original_created_at: String,
    pub carried_over_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
