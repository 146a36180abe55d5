use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{require_date, require_text, ColumnOf, FlaggedKind, SyncKind};
use crate::entities::mistake;

/// Mistakes log: what went wrong, how to fix it, and whether it was avoided since.
pub struct Mistakes;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeDraft {
    pub date: String,
    pub mistake: String,
    pub solution: String,
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMistake {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: String,
    pub mistake: String,
    pub solution: String,
    pub category: String,
    pub created_at: String,
    #[serde(default)]
    pub avoided: Option<bool>,
}

impl SyncKind for Mistakes {
    type Entity = mistake::Entity;
    type Model = mistake::Model;
    type ActiveModel = mistake::ActiveModel;
    type Draft = MistakeDraft;
    type Remote = RemoteMistake;

    const NAME: &'static str = "mistakes";
    const ENDPOINT: &'static str = "/api/mistakes";
    const LIST_FILTER: &'static str = "date";
    const COLLECTION_KEY: &'static str = "mistakes";
    const SCHEMA: &'static [&'static str] = &[
        r"
        CREATE TABLE IF NOT EXISTS mistakes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            server_id TEXT,
            date TEXT NOT NULL,
            mistake TEXT NOT NULL,
            solution TEXT NOT NULL,
            category TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            avoided INTEGER NOT NULL DEFAULT 0,
            synced INTEGER NOT NULL DEFAULT 0
        )
        ",
        "CREATE INDEX IF NOT EXISTS idx_mistakes_date ON mistakes(date)",
        "CREATE INDEX IF NOT EXISTS idx_mistakes_server ON mistakes(server_id)",
        "CREATE INDEX IF NOT EXISTS idx_mistakes_category ON mistakes(category)",
    ];

    fn id_column() -> ColumnOf<Self> {
        mistake::Column::Id
    }

    fn server_id_column() -> ColumnOf<Self> {
        mistake::Column::ServerId
    }

    fn date_column() -> ColumnOf<Self> {
        mistake::Column::Date
    }

    fn timestamp_column() -> ColumnOf<Self> {
        mistake::Column::Timestamp
    }

    fn synced_column() -> ColumnOf<Self> {
        mistake::Column::Synced
    }

    fn validate(draft: &MistakeDraft) -> Result<(), String> {
        require_date(&draft.date, "date")?;
        require_text(&draft.mistake, "mistake")?;
        require_text(&draft.solution, "solution")?;
        require_text(&draft.category, "category")
    }

    fn local_row(draft: &MistakeDraft, timestamp: &str) -> mistake::ActiveModel {
        mistake::ActiveModel {
            id: NotSet,
            server_id: Set(None),
            date: Set(draft.date.clone()),
            mistake: Set(draft.mistake.trim().to_owned()),
            solution: Set(draft.solution.trim().to_owned()),
            category: Set(draft.category.clone()),
            timestamp: Set(timestamp.to_owned()),
            avoided: Set(false),
            synced: Set(false),
        }
    }

    fn remote_row(remote: &RemoteMistake) -> mistake::ActiveModel {
        mistake::ActiveModel {
            id: NotSet,
            server_id: Set(Some(remote.id.clone())),
            date: Set(remote.date.clone()),
            mistake: Set(remote.mistake.clone()),
            solution: Set(remote.solution.clone()),
            category: Set(remote.category.clone()),
            timestamp: Set(remote.created_at.clone()),
            // The flag is local bookkeeping unless the backend reports it.
            avoided: remote.avoided.map_or(NotSet, Set),
            synced: Set(true),
        }
    }

    fn remote_id(remote: &RemoteMistake) -> &str {
        &remote.id
    }

    fn push_body(model: &mistake::Model) -> Value {
        json!({
            "mistake": model.mistake,
            "solution": model.solution,
            "category": model.category,
            "date": model.date,
        })
    }

    fn local_id(model: &mistake::Model) -> i32 {
        model.id
    }

    fn server_id(model: &mistake::Model) -> Option<&str> {
        model.server_id.as_deref()
    }

    fn timestamp(model: &mistake::Model) -> &str {
        &model.timestamp
    }

    fn is_synced(model: &mistake::Model) -> bool {
        model.synced
    }
}

impl FlaggedKind for Mistakes {
    const FLAG_NAME: &'static str = "avoided";

    fn flag_column() -> ColumnOf<Self> {
        mistake::Column::Avoided
    }

    fn flag(model: &mistake::Model) -> bool {
        model.avoided
    }
}
