//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted to-do record and the caller-supplied draft shape.
//! - Keep priority labels and attachment encoding in one place.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` must be non-empty at save time; callers check this through
//!   `TaskDraft::validate()` before handing a draft to the store.
//! - `attachment_paths` are opaque references; file existence is not tracked.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a persisted task.
pub type TaskId = Uuid;

const ATTACHMENT_SEPARATOR: &str = ",";

/// Task priority label.
///
/// No `Ord`; the query engine compares the literal labels (`"High" < "Low" < "Medium"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Returns the persisted/display label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Parses an exact persisted label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted to-do record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// Ordered opaque attachment references.
    pub attachment_paths: Vec<String>,
    pub priority: Priority,
    /// Unix epoch milliseconds. `None` only for rows written without a due date.
    pub due_at: Option<i64>,
    pub is_completed: bool,
}

/// Caller-supplied fields for add/update.
///
/// Completion state is not part of the draft: new tasks always start
/// uncompleted and updates keep the stored flag.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub attachment_paths: Vec<String>,
    pub priority: Priority,
    pub due_at: Option<i64>,
}

impl TaskDraft {
    /// Creates a draft with no description or attachments.
    pub fn new(title: impl Into<String>, priority: Priority, due_at: Option<i64>) -> Self {
        Self {
            title: title.into(),
            description: None,
            attachment_paths: Vec::new(),
            priority,
            due_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets attachment references; empty references are skipped.
    pub fn with_attachments<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attachment_paths = paths
            .into_iter()
            .map(Into::into)
            .filter(|path: &String| !path.is_empty())
            .collect();
        self
    }

    /// Checks the save-time title rule.
    ///
    /// The store does not call this; presentation callers surface the error
    /// as a user-facing message before calling add/update.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Builds the stored record for a freshly created task.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            attachment_paths: self.attachment_paths,
            priority: self.priority,
            due_at: self.due_at,
            is_completed: false,
        }
    }
}

/// Save-time validation failure shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Joins attachment references into the single persisted column value.
///
/// Empty references are dropped; returns `None` when nothing is left.
pub fn encode_attachments(paths: &[String]) -> Option<String> {
    let kept = paths
        .iter()
        .filter(|path| !path.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>();
    if kept.is_empty() {
        return None;
    }
    Some(kept.join(ATTACHMENT_SEPARATOR))
}

/// Splits a persisted attachment column back into ordered references.
pub fn decode_attachments(value: Option<&str>) -> Vec<String> {
    match value {
        None | Some("") => Vec::new(),
        Some(joined) => joined
            .split(ATTACHMENT_SEPARATOR)
            .map(str::to_string)
            .collect(),
    }
}

/// Creates a fresh stable task ID.
pub fn new_task_id() -> TaskId {
    Uuid::new_v4()
}
