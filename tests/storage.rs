use unwind::kinds::{
    Journal, JournalDraft, MistakeDraft, Mistakes, RemoteJournalEntry, RemoteMistake, RemoteTodo, TodoChanges, TodoDraft, Todos,
};
use unwind::storage::{LocalStorage, RecordKey, StoreError};

fn remote_entry(id: &str, date: &str, content: &str, created_at: &str) -> RemoteJournalEntry {
    RemoteJournalEntry {
        id: id.to_string(),
        date: date.to_string(),
        content: content.to_string(),
        created_at: created_at.to_string(),
    }
}

fn mistake_draft(text: &str) -> MistakeDraft {
    MistakeDraft {
        date: "2024-03-01".to_string(),
        mistake: text.to_string(),
        solution: "Slow down".to_string(),
        category: "work".to_string(),
    }
}

#[tokio::test]
async fn test_operations_fail_before_schema_exists() {
    let storage = LocalStorage::connect("sqlite::memory:").await.unwrap();
    assert!(!storage.is_ready());

    let err = storage.list_latest::<Journal>(10).await.unwrap_err();
    assert!(matches!(err, StoreError::NotReady));

    storage.init_schema().await.unwrap();
    assert!(storage.is_ready());
    assert!(storage.list_latest::<Journal>(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_init_schema_is_idempotent() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    storage
        .insert_local::<Journal>(&JournalDraft::new("2024-01-01", "first"))
        .await
        .unwrap();

    storage.init_schema().await.unwrap();
    storage.ping().await.unwrap();

    assert_eq!(storage.list_latest::<Journal>(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_insert_returns_unsynced_row_with_local_id() {
    let storage = LocalStorage::open_in_memory().await.unwrap();

    let row = storage
        .insert_local::<Journal>(&JournalDraft::new("2024-01-01", "  Long walk  "))
        .await
        .unwrap();

    assert!(row.id > 0);
    assert_eq!(row.content, "Long walk");
    assert_eq!(row.server_id, None);
    assert!(!row.synced);
    assert!(row.timestamp.ends_with('Z'));
}

#[tokio::test]
async fn test_list_latest_is_newest_first_and_bounded() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    for (day, ts) in [
        ("2024-01-01", "2024-01-01T08:00:00.000Z"),
        ("2024-01-03", "2024-01-03T08:00:00.000Z"),
        ("2024-01-02", "2024-01-02T08:00:00.000Z"),
    ] {
        storage
            .insert_local_at::<Journal>(&JournalDraft::new(day, format!("entry {day}")), ts)
            .await
            .unwrap();
    }

    let latest = storage.list_latest::<Journal>(2).await.unwrap();
    let days: Vec<_> = latest.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(days, ["2024-01-03", "2024-01-02"]);
}

#[tokio::test]
async fn test_ordering_mixes_server_and_local_timestamps() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    storage
        .insert_local_at::<Journal>(&JournalDraft::new("2024-01-01", "local"), "2024-01-01T09:30:00.000Z")
        .await
        .unwrap();
    storage
        .upsert_from_server::<Journal>(&remote_entry("srv1", "2024-01-01", "server", "2024-01-01T10:00:00Z"))
        .await
        .unwrap();

    let latest = storage.list_latest::<Journal>(10).await.unwrap();
    assert_eq!(latest[0].content, "server");
    assert_eq!(latest[1].content, "local");
}

#[tokio::test]
async fn test_list_by_date_filters_and_sorts_ascending() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    storage
        .insert_local_at::<Journal>(&JournalDraft::new("2024-02-01", "evening"), "2024-02-01T20:00:00.000Z")
        .await
        .unwrap();
    storage
        .insert_local_at::<Journal>(&JournalDraft::new("2024-02-01", "morning"), "2024-02-01T07:00:00.000Z")
        .await
        .unwrap();
    storage
        .insert_local_at::<Journal>(&JournalDraft::new("2024-02-02", "next day"), "2024-02-02T07:00:00.000Z")
        .await
        .unwrap();

    let day = storage.list_by_date::<Journal>("2024-02-01").await.unwrap();
    let contents: Vec<_> = day.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, ["morning", "evening"]);
}

#[tokio::test]
async fn test_upsert_from_server_is_keyed_on_server_id() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    let first = remote_entry("abc", "2024-01-05", "draft", "2024-01-05T10:00:00Z");

    let id1 = storage.upsert_from_server::<Journal>(&first).await.unwrap();
    let id2 = storage.upsert_from_server::<Journal>(&first).await.unwrap();
    assert_eq!(id1, id2);

    let edited = remote_entry("abc", "2024-01-05", "final", "2024-01-05T10:00:00Z");
    let id3 = storage.upsert_from_server::<Journal>(&edited).await.unwrap();
    assert_eq!(id1, id3);

    let rows = storage.list_latest::<Journal>(10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content, "final");
    assert!(rows[0].synced);
    assert_eq!(rows[0].server_id.as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_upsert_keeps_local_flag_when_server_omits_it() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    let remote = RemoteMistake {
        id: "m1".to_string(),
        date: "2024-03-01".to_string(),
        mistake: "Skipped lunch".to_string(),
        solution: "Set a reminder".to_string(),
        category: "health".to_string(),
        created_at: "2024-03-01T12:00:00Z".to_string(),
        avoided: None,
    };

    let id = storage.upsert_from_server::<Mistakes>(&remote).await.unwrap();
    assert!(storage.set_flag::<Mistakes>(id, true).await.unwrap());

    storage.upsert_from_server::<Mistakes>(&remote).await.unwrap();
    let row = storage.get::<Mistakes>(id).await.unwrap().unwrap();
    assert!(row.avoided);

    let reported = RemoteMistake {
        avoided: Some(false),
        ..remote
    };
    storage.upsert_from_server::<Mistakes>(&reported).await.unwrap();
    let row = storage.get::<Mistakes>(id).await.unwrap().unwrap();
    assert!(!row.avoided);
}

#[tokio::test]
async fn test_mark_synced_sets_server_id() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    let row = storage
        .insert_local::<Journal>(&JournalDraft::new("2024-01-01", "hello"))
        .await
        .unwrap();

    let marked = storage
        .mark_synced::<Journal>(row.id, "srv-9", Some("2024-01-01T10:00:00Z"))
        .await
        .unwrap();
    assert!(marked);

    let row = storage.get::<Journal>(row.id).await.unwrap().unwrap();
    assert!(row.synced);
    assert_eq!(row.server_id.as_deref(), Some("srv-9"));
    assert_eq!(row.timestamp, "2024-01-01T10:00:00Z");
    assert!(storage.list_unsynced::<Journal>().await.unwrap().is_empty());

    let by_server = storage.get_by_server_id::<Journal>("srv-9").await.unwrap().unwrap();
    assert_eq!(by_server.id, row.id);

    assert!(!storage.mark_synced::<Journal>(999, "nope", None).await.unwrap());
}

#[tokio::test]
async fn test_set_flag_targets_one_row() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    let a = storage.insert_local::<Mistakes>(&mistake_draft("a")).await.unwrap();
    let b = storage.insert_local::<Mistakes>(&mistake_draft("b")).await.unwrap();

    assert!(storage.set_flag::<Mistakes>(a.id, true).await.unwrap());
    assert!(!storage.set_flag::<Mistakes>(4242, true).await.unwrap());

    assert!(storage.get::<Mistakes>(a.id).await.unwrap().unwrap().avoided);
    assert!(!storage.get::<Mistakes>(b.id).await.unwrap().unwrap().avoided);
}

#[tokio::test]
async fn test_delete_by_local_or_server_key() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    let local = storage
        .insert_local::<Journal>(&JournalDraft::new("2024-01-01", "local only"))
        .await
        .unwrap();
    storage
        .upsert_from_server::<Journal>(&remote_entry("srv1", "2024-01-01", "remote", "2024-01-01T10:00:00Z"))
        .await
        .unwrap();

    assert_eq!(storage.delete::<Journal>(&RecordKey::Local(local.id)).await.unwrap(), 1);
    assert_eq!(storage.delete::<Journal>(&RecordKey::from("srv1")).await.unwrap(), 1);
    assert_eq!(storage.delete::<Journal>(&RecordKey::Local(local.id)).await.unwrap(), 0);
    assert!(storage.list_latest::<Journal>(10).await.unwrap().is_empty());
}

#[test]
fn test_record_key_prefers_local_id() {
    assert_eq!(
        RecordKey::from_ids(Some(3), Some("srv".to_string())),
        Some(RecordKey::Local(3))
    );
    assert_eq!(
        RecordKey::from_ids(None, Some("srv".to_string())),
        Some(RecordKey::Server("srv".to_string()))
    );
    assert_eq!(RecordKey::from_ids(None, None), None);
}

#[tokio::test]
async fn test_update_fields_changes_only_given_columns() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    let todo = storage
        .insert_local::<Todos>(&TodoDraft::new("Write report", "work").with_description("Q1 numbers"))
        .await
        .unwrap();

    let changes = TodoChanges {
        priority: Some("high".to_string()),
        due_date: Some(Some("2024-04-01".to_string())),
        ..TodoChanges::default()
    };
    let updated = storage
        .update_fields::<Todos>(todo.id, changes.into_active_model("2024-03-30T09:00:00.000Z"))
        .await
        .unwrap();
    assert!(updated);

    let row = storage.get::<Todos>(todo.id).await.unwrap().unwrap();
    assert_eq!(row.title, "Write report");
    assert_eq!(row.description.as_deref(), Some("Q1 numbers"));
    assert_eq!(row.priority, "high");
    assert_eq!(row.due_date.as_deref(), Some("2024-04-01"));
    assert_eq!(row.timestamp, "2024-03-30T09:00:00.000Z");
    assert_eq!(row.created_at, todo.created_at);
}

#[tokio::test]
async fn test_carry_over_moves_task_in_one_step() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    for n in 1..=5 {
        storage
            .insert_local::<Todos>(&TodoDraft::new(format!("task {n}"), "home"))
            .await
            .unwrap();
    }
    let source = storage.get::<Todos>(5).await.unwrap().unwrap();

    let moved = storage.carry_over(5).await.unwrap();

    assert_eq!(moved.original_task_id, Some(5));
    assert_eq!(moved.title, "task 5");
    assert_eq!(moved.category, "home");
    assert_eq!(moved.priority, "medium");
    assert_eq!(moved.original_created_at, source.created_at);
    assert_eq!(moved.carried_over_at, moved.updated_at);
    assert!(storage.get::<Todos>(5).await.unwrap().is_none());
    assert_eq!(storage.list_todos_by_category("home").await.unwrap().len(), 4);

    let carried = storage.list_carried_over("home").await.unwrap();
    assert_eq!(carried.len(), 1);
    assert_eq!(carried[0].id, moved.id);
}

#[tokio::test]
async fn test_carry_over_missing_task_is_not_found() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    let err = storage.carry_over(99).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "todos", .. }));
    assert!(storage.list_carried_over("home").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_carry_over_all_pending_skips_completed() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    let done = storage
        .insert_local::<Todos>(&TodoDraft::new("done", "work"))
        .await
        .unwrap();
    storage
        .insert_local::<Todos>(&TodoDraft::new("open 1", "work"))
        .await
        .unwrap();
    storage
        .insert_local::<Todos>(&TodoDraft::new("open 2", "personal"))
        .await
        .unwrap();
    storage.set_flag::<Todos>(done.id, true).await.unwrap();

    let moved = storage.carry_over_all_pending().await.unwrap();

    assert_eq!(moved, 2);
    let remaining = storage.list_todos_by_category("work").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "done");
    assert_eq!(storage.list_carried_over("work").await.unwrap().len(), 1);
    assert_eq!(storage.list_carried_over("personal").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_open_path_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data").join("unwind.db");

    let storage = LocalStorage::open_path(&path).await.unwrap();
    storage
        .insert_local::<Journal>(&JournalDraft::new("2024-01-01", "persisted"))
        .await
        .unwrap();
    storage.close().await.unwrap();

    let reopened = LocalStorage::open_path(&path).await.unwrap();
    let rows = reopened.list_latest::<Journal>(10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content, "persisted");
}

#[tokio::test]
async fn test_category_view_orders_mixed_timestamps() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    storage
        .insert_local_at::<Todos>(&TodoDraft::new("Later in the second", "work"), "2024-01-01T10:00:00.500Z")
        .await
        .unwrap();
    storage
        .upsert_from_server::<Todos>(&RemoteTodo {
            id: "t1".to_string(),
            title: "Start of the second".to_string(),
            description: None,
            category: "work".to_string(),
            priority: "low".to_string(),
            completed: None,
            due_date: None,
            created_at: "2024-01-01T10:00:00Z".to_string(),
            updated_at: None,
        })
        .await
        .unwrap();

    let rows = storage.list_todos_by_category("work").await.unwrap();
    let titles: Vec<&str> = rows.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Later in the second", "Start of the second"]);
}

#[tokio::test]
async fn test_completing_todo_restamps_it() {
    let storage = LocalStorage::open_in_memory().await.unwrap();
    let row = storage
        .insert_local_at::<Todos>(&TodoDraft::new("Renew passport", "admin"), "2024-01-01T09:00:00.000Z")
        .await
        .unwrap();

    assert!(storage.set_flag::<Todos>(row.id, true).await.unwrap());
    let done = storage.get::<Todos>(row.id).await.unwrap().unwrap();
    assert!(done.completed);
    assert_eq!(done.created_at, "2024-01-01T09:00:00.000Z");
    assert_ne!(done.timestamp, "2024-01-01T09:00:00.000Z");
}

#[tokio::test]
async fn test_close_through_shared_handle() {
    let storage = std::sync::Arc::new(LocalStorage::open_in_memory().await.unwrap());
    let shared = std::sync::Arc::clone(&storage);

    shared.close().await.unwrap();
    assert!(!storage.is_ready());
    assert!(matches!(storage.list_latest::<Journal>(1).await, Err(StoreError::NotReady)));
}
