use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "overthinking")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub server_id: Option<String>,
    pub date: String,
    pub thought: String,
    pub solution: Option<String>,
    pub timestamp: String,
    pub dumped: bool,
    pub synced: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
