use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{require_date, require_text, ColumnOf, FlaggedKind, SyncKind};
use crate::entities::overthinking;

/// Overthinking journal: a looping thought, an optional way out, and whether it was let go.
pub struct Overthinking;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverthinkingDraft {
    pub date: String,
    pub thought: String,
    pub solution: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteThought {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: String,
    pub thought: String,
    #[serde(default)]
    pub solution: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub dumped: Option<bool>,
}

impl SyncKind for Overthinking {
    type Entity = overthinking::Entity;
    type Model = overthinking::Model;
    type ActiveModel = overthinking::ActiveModel;
    type Draft = OverthinkingDraft;
    type Remote = RemoteThought;

    const NAME: &'static str = "overthinking";
    const ENDPOINT: &'static str = "/api/overthinking";
    const LIST_FILTER: &'static str = "date";
    const COLLECTION_KEY: &'static str = "thoughts";
    const SCHEMA: &'static [&'static str] = &[
        r"
        CREATE TABLE IF NOT EXISTS overthinking (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            server_id TEXT,
            date TEXT NOT NULL,
            thought TEXT NOT NULL,
            solution TEXT,
            timestamp TEXT NOT NULL,
            dumped INTEGER NOT NULL DEFAULT 0,
            synced INTEGER NOT NULL DEFAULT 0
        )
        ",
        "CREATE INDEX IF NOT EXISTS idx_overthinking_date ON overthinking(date)",
        "CREATE INDEX IF NOT EXISTS idx_overthinking_server ON overthinking(server_id)",
    ];

    fn id_column() -> ColumnOf<Self> {
        overthinking::Column::Id
    }

    fn server_id_column() -> ColumnOf<Self> {
        overthinking::Column::ServerId
    }

    fn date_column() -> ColumnOf<Self> {
        overthinking::Column::Date
    }

    fn timestamp_column() -> ColumnOf<Self> {
        overthinking::Column::Timestamp
    }

    fn synced_column() -> ColumnOf<Self> {
        overthinking::Column::Synced
    }

    fn validate(draft: &OverthinkingDraft) -> Result<(), String> {
        require_date(&draft.date, "date")?;
        require_text(&draft.thought, "thought")
    }

    fn local_row(draft: &OverthinkingDraft, timestamp: &str) -> overthinking::ActiveModel {
        let solution = draft
            .solution
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        overthinking::ActiveModel {
            id: NotSet,
            server_id: Set(None),
            date: Set(draft.date.clone()),
            thought: Set(draft.thought.trim().to_owned()),
            solution: Set(solution),
            timestamp: Set(timestamp.to_owned()),
            dumped: Set(false),
            synced: Set(false),
        }
    }

    fn remote_row(remote: &RemoteThought) -> overthinking::ActiveModel {
        overthinking::ActiveModel {
            id: NotSet,
            server_id: Set(Some(remote.id.clone())),
            date: Set(remote.date.clone()),
            thought: Set(remote.thought.clone()),
            solution: Set(remote.solution.clone()),
            timestamp: Set(remote.created_at.clone()),
            dumped: remote.dumped.map_or(NotSet, Set),
            synced: Set(true),
        }
    }

    fn remote_id(remote: &RemoteThought) -> &str {
        &remote.id
    }

    fn push_body(model: &overthinking::Model) -> Value {
        json!({
            "thought": model.thought,
            "solution": model.solution,
            "date": model.date,
        })
    }

    fn local_id(model: &overthinking::Model) -> i32 {
        model.id
    }

    fn server_id(model: &overthinking::Model) -> Option<&str> {
        model.server_id.as_deref()
    }

    fn timestamp(model: &overthinking::Model) -> &str {
        &model.timestamp
    }

    fn is_synced(model: &overthinking::Model) -> bool {
        model.synced
    }
}

impl FlaggedKind for Overthinking {
    const FLAG_NAME: &'static str = "dumped";

    fn flag_column() -> ColumnOf<Self> {
        overthinking::Column::Dumped
    }

    fn flag(model: &overthinking::Model) -> bool {
        model.dumped
    }
}
