use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{require_date, require_text, ColumnOf, SyncKind};
use crate::entities::journal;

/// Journal entries: free text attached to a day.
pub struct Journal;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalDraft {
    pub date: String,
    pub content: String,
}

impl JournalDraft {
    pub fn new(date: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteJournalEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: String,
    pub content: String,
    pub created_at: String,
}

impl SyncKind for Journal {
    type Entity = journal::Entity;
    type Model = journal::Model;
    type ActiveModel = journal::ActiveModel;
    type Draft = JournalDraft;
    type Remote = RemoteJournalEntry;

    const NAME: &'static str = "journal";
    const ENDPOINT: &'static str = "/api/journal";
    const LIST_FILTER: &'static str = "date";
    const COLLECTION_KEY: &'static str = "entries";
    const SCHEMA: &'static [&'static str] = &[
        r"
        CREATE TABLE IF NOT EXISTS journal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            server_id TEXT,
            date TEXT NOT NULL,
            content TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            synced INTEGER NOT NULL DEFAULT 0
        )
        ",
        "CREATE INDEX IF NOT EXISTS idx_journal_date ON journal(date)",
        "CREATE INDEX IF NOT EXISTS idx_journal_server ON journal(server_id)",
    ];

    fn id_column() -> ColumnOf<Self> {
        journal::Column::Id
    }

    fn server_id_column() -> ColumnOf<Self> {
        journal::Column::ServerId
    }

    fn date_column() -> ColumnOf<Self> {
        journal::Column::Date
    }

    fn timestamp_column() -> ColumnOf<Self> {
        journal::Column::Timestamp
    }

    fn synced_column() -> ColumnOf<Self> {
        journal::Column::Synced
    }

    fn validate(draft: &JournalDraft) -> Result<(), String> {
        require_date(&draft.date, "date")?;
        require_text(&draft.content, "content")
    }

    fn local_row(draft: &JournalDraft, timestamp: &str) -> journal::ActiveModel {
        journal::ActiveModel {
            id: NotSet,
            server_id: Set(None),
            date: Set(draft.date.clone()),
            content: Set(draft.content.trim().to_owned()),
            timestamp: Set(timestamp.to_owned()),
            synced: Set(false),
        }
    }

    fn remote_row(remote: &RemoteJournalEntry) -> journal::ActiveModel {
        journal::ActiveModel {
            id: NotSet,
            server_id: Set(Some(remote.id.clone())),
            date: Set(remote.date.clone()),
            content: Set(remote.content.clone()),
            timestamp: Set(remote.created_at.clone()),
            synced: Set(true),
        }
    }

    fn remote_id(remote: &RemoteJournalEntry) -> &str {
        &remote.id
    }

    fn push_body(model: &journal::Model) -> Value {
        json!({
            "content": model.content,
            "date": model.date,
        })
    }

    fn local_id(model: &journal::Model) -> i32 {
        model.id
    }

    fn server_id(model: &journal::Model) -> Option<&str> {
        model.server_id.as_deref()
    }

    fn timestamp(model: &journal::Model) -> &str {
        &model.timestamp
    }

    fn is_synced(model: &journal::Model) -> bool {
        model.synced
    }
}
