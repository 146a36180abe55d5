use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub server_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: String,
    pub completed: bool,
    pub due_date: Option<String>,
    pub created_at: String,
    /// Last local modification; drives sort order like the other kinds.
    pub timestamp: String,
    pub synced: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
