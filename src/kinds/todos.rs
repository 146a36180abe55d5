use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{require_date, require_text, ColumnOf, FlaggedKind, SyncKind};
use crate::constants::DEFAULT_TODO_PRIORITY;
use crate::entities::todo;

pub struct Todos;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: String,
    pub due_date: Option<String>,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            category: category.into(),
            priority: DEFAULT_TODO_PRIORITY.to_string(),
            due_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }
}

/// Partial edit of a todo. `None` leaves a field untouched; for the nullable
/// fields `Some(None)` clears the value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<Option<String>>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_text(title, "title")?;
        }
        if let Some(category) = &self.category {
            require_text(category, "category")?;
        }
        if let Some(priority) = &self.priority {
            require_text(priority, "priority")?;
        }
        if let Some(Some(due)) = &self.due_date {
            require_date(due, "due_date")?;
        }
        Ok(())
    }

    /// Active model with only the changed columns set, stamped with `timestamp`.
    pub fn into_active_model(self, timestamp: &str) -> todo::ActiveModel {
        todo::ActiveModel {
            title: self.title.map_or(NotSet, |t| Set(t.trim().to_owned())),
            description: self.description.map_or(NotSet, Set),
            category: self.category.map_or(NotSet, Set),
            priority: self.priority.map_or(NotSet, Set),
            due_date: self.due_date.map_or(NotSet, Set),
            timestamp: Set(timestamp.to_owned()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTodo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub due_date: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_priority() -> String {
    DEFAULT_TODO_PRIORITY.to_string()
}

impl Todos {
    /// Body of `PUT /api/todos/:id`.
    pub fn update_body(model: &todo::Model) -> Value {
        let mut body = Self::push_body(model);
        body["completed"] = json!(model.completed);
        body
    }
}

impl SyncKind for Todos {
    type Entity = todo::Entity;
    type Model = todo::Model;
    type ActiveModel = todo::ActiveModel;
    type Draft = TodoDraft;
    type Remote = RemoteTodo;

    const NAME: &'static str = "todos";
    const ENDPOINT: &'static str = "/api/todos";
    const LIST_FILTER: &'static str = "category";
    const COLLECTION_KEY: &'static str = "todos";
    const SCHEMA: &'static [&'static str] = &[
        r"
        CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            server_id TEXT,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            priority TEXT NOT NULL DEFAULT 'medium',
            completed INTEGER NOT NULL DEFAULT 0,
            due_date TEXT,
            created_at TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            synced INTEGER NOT NULL DEFAULT 0
        )
        ",
        // original_task_id points at a row that is deleted in the same
        // transaction, so it carries no foreign key.
        r"
        CREATE TABLE IF NOT EXISTS carried_over_todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            original_task_id INTEGER,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            priority TEXT NOT NULL DEFAULT 'medium',
            completed INTEGER NOT NULL DEFAULT 0,
            due_date TEXT,
            original_created_at TEXT NOT NULL,
            carried_over_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
        "CREATE INDEX IF NOT EXISTS idx_todos_category ON todos(category)",
        "CREATE INDEX IF NOT EXISTS idx_todos_completed ON todos(completed)",
        "CREATE INDEX IF NOT EXISTS idx_todos_due_date ON todos(due_date)",
        "CREATE INDEX IF NOT EXISTS idx_todos_server ON todos(server_id)",
        "CREATE INDEX IF NOT EXISTS idx_carried_over_category ON carried_over_todos(category)",
        "CREATE INDEX IF NOT EXISTS idx_carried_over_completed ON carried_over_todos(completed)",
    ];

    fn id_column() -> ColumnOf<Self> {
        todo::Column::Id
    }

    fn server_id_column() -> ColumnOf<Self> {
        todo::Column::ServerId
    }

    fn date_column() -> ColumnOf<Self> {
        todo::Column::DueDate
    }

    fn timestamp_column() -> ColumnOf<Self> {
        todo::Column::Timestamp
    }

    fn synced_column() -> ColumnOf<Self> {
        todo::Column::Synced
    }

    fn validate(draft: &TodoDraft) -> Result<(), String> {
        require_text(&draft.title, "title")?;
        require_text(&draft.category, "category")?;
        require_text(&draft.priority, "priority")?;
        if let Some(due) = &draft.due_date {
            require_date(due, "due_date")?;
        }
        Ok(())
    }

    fn local_row(draft: &TodoDraft, timestamp: &str) -> todo::ActiveModel {
        todo::ActiveModel {
            id: NotSet,
            server_id: Set(None),
            title: Set(draft.title.trim().to_owned()),
            description: Set(draft.description.clone()),
            category: Set(draft.category.clone()),
            priority: Set(draft.priority.clone()),
            completed: Set(false),
            due_date: Set(draft.due_date.clone()),
            created_at: Set(timestamp.to_owned()),
            timestamp: Set(timestamp.to_owned()),
            synced: Set(false),
        }
    }

    fn remote_row(remote: &RemoteTodo) -> todo::ActiveModel {
        let touched = remote.updated_at.as_ref().unwrap_or(&remote.created_at);
        todo::ActiveModel {
            id: NotSet,
            server_id: Set(Some(remote.id.clone())),
            title: Set(remote.title.clone()),
            description: Set(remote.description.clone()),
            category: Set(remote.category.clone()),
            priority: Set(remote.priority.clone()),
            completed: remote.completed.map_or(NotSet, Set),
            due_date: Set(remote.due_date.clone()),
            created_at: Set(remote.created_at.clone()),
            timestamp: Set(touched.clone()),
            synced: Set(true),
        }
    }

    fn remote_id(remote: &RemoteTodo) -> &str {
        &remote.id
    }

    fn push_body(model: &todo::Model) -> Value {
        json!({
            "title": model.title,
            "description": model.description,
            "category": model.category,
            "priority": model.priority,
            "dueDate": model.due_date,
        })
    }

    fn local_id(model: &todo::Model) -> i32 {
        model.id
    }

    fn server_id(model: &todo::Model) -> Option<&str> {
        model.server_id.as_deref()
    }

    fn timestamp(model: &todo::Model) -> &str {
        &model.timestamp
    }

    fn is_synced(model: &todo::Model) -> bool {
        model.synced
    }
}

impl FlaggedKind for Todos {
    const FLAG_NAME: &'static str = "completed";
    const FLAG_RESTAMPS: bool = true;

    fn flag_column() -> ColumnOf<Self> {
        todo::Column::Completed
    }

    fn flag(model: &todo::Model) -> bool {
        model.completed
    }

    fn flag_update_body(model: &todo::Model) -> Option<Value> {
        Some(Self::update_body(model))
    }
}
