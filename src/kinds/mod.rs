//! Entity kind descriptors.
//!
//! Every syncable kind (journal, mistakes, overthinking, todos) is described by a
//! zero-sized type implementing [`SyncKind`]. The descriptor is pure data: which
//! table and columns hold the shared sync fields, how a local draft becomes a
//! row, how a server record maps onto a row and which endpoint it talks to.
//! Storage, the API client and the sync modules are written once against this
//! trait.

pub mod journal;
pub mod mistakes;
pub mod overthinking;
pub mod todos;

use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait, FromQueryResult, IntoActiveModel, ModelTrait};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use journal::{Journal, JournalDraft, RemoteJournalEntry};
pub use mistakes::{MistakeDraft, Mistakes, RemoteMistake};
pub use overthinking::{Overthinking, OverthinkingDraft, RemoteThought};
pub use todos::{RemoteTodo, TodoChanges, TodoDraft, Todos};

/// Column type of a kind's entity.
pub type ColumnOf<K> = <<K as SyncKind>::Entity as EntityTrait>::Column;

/// Descriptor of one syncable entity kind.
pub trait SyncKind: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Clone
        + Send
        + Sync
        + 'static;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + 'static;
    /// Fields the user fills in when creating a record.
    type Draft: Send + Sync + 'static;
    /// Record shape returned by the backend list endpoint.
    type Remote: DeserializeOwned + Send + Sync + 'static;

    /// Short name used in logs and notices.
    const NAME: &'static str;
    /// REST collection path, e.g. `/api/journal`.
    const ENDPOINT: &'static str;
    /// Query parameter the list endpoint filters on.
    const LIST_FILTER: &'static str;
    /// Key holding the records in a list response object.
    const COLLECTION_KEY: &'static str;
    /// Idempotent DDL statements creating the kind's tables and indexes.
    const SCHEMA: &'static [&'static str];

    fn id_column() -> ColumnOf<Self>;
    fn server_id_column() -> ColumnOf<Self>;
    /// Column used by the equality filter of `list_by_date`.
    fn date_column() -> ColumnOf<Self>;
    fn timestamp_column() -> ColumnOf<Self>;
    fn synced_column() -> ColumnOf<Self>;

    /// Rejects drafts that must not be stored.
    fn validate(draft: &Self::Draft) -> Result<(), String>;
    /// New unsynced row for a draft, stamped with `timestamp`.
    fn local_row(draft: &Self::Draft, timestamp: &str) -> Self::ActiveModel;
    /// Synced row carrying a server record. The primary key is left unset.
    fn remote_row(remote: &Self::Remote) -> Self::ActiveModel;
    fn remote_id(remote: &Self::Remote) -> &str;
    /// JSON body of the create call.
    fn push_body(model: &Self::Model) -> Value;

    fn local_id(model: &Self::Model) -> i32;
    fn server_id(model: &Self::Model) -> Option<&str>;
    fn timestamp(model: &Self::Model) -> &str;
    fn is_synced(model: &Self::Model) -> bool;
}

/// Kinds carrying a user-toggled status flag (mistake avoided, thought dumped, todo completed).
pub trait FlaggedKind: SyncKind {
    const FLAG_NAME: &'static str;

    /// Flag changes also move the row's timestamp.
    const FLAG_RESTAMPS: bool = false;

    fn flag_column() -> ColumnOf<Self>;
    fn flag(model: &Self::Model) -> bool;

    /// Body of the `PUT` that mirrors a flag change on the backend. `None`
    /// keeps the flag local.
    fn flag_update_body(_model: &Self::Model) -> Option<Value> {
        None
    }
}

pub(crate) fn require_text(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

pub(crate) fn require_date(value: &str, field: &str) -> Result<(), String> {
    crate::utils::datetime::parse_date(value)
        .map(|_| ())
        .map_err(|e| format!("{field} must be a YYYY-MM-DD date, got '{value}': {e}"))
}
