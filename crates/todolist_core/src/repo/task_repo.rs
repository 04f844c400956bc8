//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `tasks` table.
//! - Broadcast a [`TaskChange`] after every committed mutation.
//!
//! # Invariants
//! - Each write is one autocommit statement, durable before the call returns.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is insertion order.

use crate::db::DbError;
use crate::model::task::{
    decode_attachments, encode_attachments, new_task_id, Priority, Task, TaskDraft, TaskId,
};
use crate::repo::notify::{TaskChange, TaskChangeHub};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    attachment_paths,
    priority,
    due_at,
    is_completed
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and lookups.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for task records.
pub trait TaskRepository {
    fn create_task(&self, draft: &TaskDraft) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Task>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Replaces title, description, attachments, priority and due date.
    fn update_task(&self, id: TaskId, draft: &TaskDraft) -> RepoResult<()>;
    fn set_completed(&self, id: TaskId, is_completed: bool) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
    changes: TaskChangeHub,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates a repository with its own (initially empty) change hub.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_change_hub(conn, TaskChangeHub::new())
    }

    /// Creates a repository that broadcasts into a shared hub.
    pub fn with_change_hub(conn: &'conn Connection, changes: TaskChangeHub) -> Self {
        Self { conn, changes }
    }

    pub fn change_hub(&self) -> &TaskChangeHub {
        &self.changes
    }

    fn ensure_changed(changed: usize, id: TaskId) -> RepoResult<()> {
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, draft: &TaskDraft) -> RepoResult<TaskId> {
        let id = new_task_id();
        self.conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                attachment_paths,
                priority,
                due_at,
                is_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0);",
            params![
                id.to_string(),
                draft.title.as_str(),
                draft.description.as_deref(),
                encode_attachments(&draft.attachment_paths),
                draft.priority.as_str(),
                draft.due_at,
            ],
        )?;

        self.changes.broadcast(TaskChange::Created(id));
        Ok(id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Task> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let task = stmt
            .query_row([id.to_string()], |row| Ok(parse_task_row(row)))
            .optional()?;

        match task {
            Some(parsed) => parsed,
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn update_task(&self, id: TaskId, draft: &TaskDraft) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                attachment_paths = ?3,
                priority = ?4,
                due_at = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?6;",
            params![
                draft.title.as_str(),
                draft.description.as_deref(),
                encode_attachments(&draft.attachment_paths),
                draft.priority.as_str(),
                draft.due_at,
                id.to_string(),
            ],
        )?;
        Self::ensure_changed(changed, id)?;

        self.changes.broadcast(TaskChange::Updated(id));
        Ok(())
    }

    fn set_completed(&self, id: TaskId, is_completed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                is_completed = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![bool_to_int(is_completed), id.to_string()],
        )?;
        Self::ensure_changed(changed, id)?;

        self.changes
            .broadcast(TaskChange::CompletionToggled { id, is_completed });
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        Self::ensure_changed(changed, id)?;

        self.changes.broadcast(TaskChange::Deleted(id));
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in tasks.id"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in tasks.is_completed"
            )));
        }
    };

    let attachments: Option<String> = row.get("attachment_paths")?;

    Ok(Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        attachment_paths: decode_attachments(attachments.as_deref()),
        priority,
        due_at: row.get("due_at")?,
        is_completed,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
