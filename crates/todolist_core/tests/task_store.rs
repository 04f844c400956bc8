use todolist_core::db::{open_db, open_db_in_memory};
use todolist_core::{
    Priority, RepoError, SqliteTaskRepository, TaskChange, TaskChangeHub, TaskDraft,
    TaskRepository,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let draft = TaskDraft::new("Buy milk", Priority::High, Some(1_720_000_000_000))
        .with_description("2 litres")
        .with_attachments(["file:///a.png", "file:///b.pdf"]);
    let id = repo.create_task(&draft).unwrap();

    let loaded = repo.get_task(id).unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, "Buy milk");
    assert_eq!(loaded.description.as_deref(), Some("2 litres"));
    assert_eq!(loaded.attachment_paths, vec!["file:///a.png", "file:///b.pdf"]);
    assert_eq!(loaded.priority, Priority::High);
    assert_eq!(loaded.due_at, Some(1_720_000_000_000));
    assert!(!loaded.is_completed);
}

#[test]
fn list_returns_tasks_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let ids = ["first", "second", "third"]
        .iter()
        .map(|title| {
            repo.create_task(&TaskDraft::new(*title, Priority::Low, None))
                .unwrap()
        })
        .collect::<Vec<_>>();

    let listed = repo.list_tasks().unwrap();
    assert_eq!(listed.iter().map(|task| task.id).collect::<Vec<_>>(), ids);
}

#[test]
fn update_replaces_fields_and_keeps_completion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let id = repo
        .create_task(
            &TaskDraft::new("draft", Priority::Low, Some(10)).with_attachments(["old.png"]),
        )
        .unwrap();
    repo.set_completed(id, true).unwrap();

    repo.update_task(id, &TaskDraft::new("final", Priority::Medium, None))
        .unwrap();

    let loaded = repo.get_task(id).unwrap();
    assert_eq!(loaded.title, "final");
    assert_eq!(loaded.priority, Priority::Medium);
    assert_eq!(loaded.due_at, None);
    assert!(loaded.attachment_paths.is_empty());
    assert!(loaded.description.is_none());
    assert!(loaded.is_completed);
}

#[test]
fn missing_ids_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let missing = Uuid::new_v4();
    let draft = TaskDraft::new("x", Priority::Low, None);

    assert!(matches!(repo.get_task(missing), Err(RepoError::NotFound(id)) if id == missing));
    assert!(matches!(repo.update_task(missing, &draft), Err(RepoError::NotFound(_))));
    assert!(matches!(repo.set_completed(missing, true), Err(RepoError::NotFound(_))));
    assert!(matches!(repo.delete_task(missing), Err(RepoError::NotFound(_))));
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let id = repo
        .create_task(&TaskDraft::new("gone", Priority::Low, None))
        .unwrap();
    repo.delete_task(id).unwrap();

    assert!(repo.list_tasks().unwrap().is_empty());
    assert!(matches!(repo.get_task(id), Err(RepoError::NotFound(_))));
}

#[test]
fn every_mutation_broadcasts_a_change() {
    let conn = open_db_in_memory().unwrap();
    let hub = TaskChangeHub::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    hub.subscribe(move |change| sink.lock().unwrap().push(*change));
    let repo = SqliteTaskRepository::with_change_hub(&conn, hub);
    assert_eq!(repo.change_hub().listener_count(), 1);

    let id = repo
        .create_task(&TaskDraft::new("watched", Priority::Low, None))
        .unwrap();
    repo.update_task(id, &TaskDraft::new("watched!", Priority::High, None))
        .unwrap();
    repo.set_completed(id, true).unwrap();
    repo.delete_task(id).unwrap();

    // Reads and failed writes stay silent.
    repo.list_tasks().unwrap();
    let _ = repo.delete_task(id);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            TaskChange::Created(id),
            TaskChange::Updated(id),
            TaskChange::CompletionToggled {
                id,
                is_completed: true
            },
            TaskChange::Deleted(id),
        ]
    );
}

#[test]
fn corrupt_rows_are_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO tasks (id, title, priority) VALUES (?1, 'bad', 'Urgent');",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let err = repo.list_tasks().unwrap_err();
    match err {
        RepoError::InvalidData(message) => assert!(message.contains("Urgent")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn writes_are_visible_after_reopening_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");

    let id = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteTaskRepository::new(&conn);
        let id = repo
            .create_task(&TaskDraft::new("durable", Priority::Medium, Some(5)))
            .unwrap();
        repo.set_completed(id, true).unwrap();
        id
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let loaded = repo.get_task(id).unwrap();
    assert_eq!(loaded.title, "durable");
    assert!(loaded.is_completed);
}

#[test]
fn lone_empty_attachment_is_stored_as_no_attachments() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut draft = TaskDraft::new("blank ref", Priority::Low, None);
    draft.attachment_paths = vec![String::new()];
    let id = repo.create_task(&draft).unwrap();

    let stored: Option<String> = conn
        .query_row(
            "SELECT attachment_paths FROM tasks WHERE id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, None);
    assert!(repo.get_task(id).unwrap().attachment_paths.is_empty());
}
