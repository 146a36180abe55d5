use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mistakes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub server_id: Option<String>,
    pub date: String,
    pub mistake: String,
    pub solution: String,
    pub category: String,
    pub timestamp: String,
    /// Set by the user once the mistake has been avoided; unrelated to sync state.
    pub avoided: bool,
    pub synced: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
