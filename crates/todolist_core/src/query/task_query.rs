//! Search, sort and partition over task snapshots.
//!
//! # Invariants
//! - `search` with an empty query is the identity.
//! - A task without a due date sorts as if it were due at `now_ms`.
//! - Priority ordering compares the literal labels, so
//!   `High < Low < Medium`. This is kept as-is until the intended product
//!   ordering is confirmed.

use crate::model::task::Task;

/// Sort keys offered to presentation callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriteria {
    DueDate,
    Priority,
}

/// Returns tasks whose title contains `query`, ignoring case.
pub fn search(tasks: &[Task], query: &str) -> Vec<Task> {
    if query.is_empty() {
        return tasks.to_vec();
    }

    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|task| task.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Orders tasks by ascending due date.
pub fn sort_by_due_date(tasks: &[Task], now_ms: i64) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|task| task.due_at.unwrap_or(now_ms));
    sorted
}

/// Orders tasks by ascending priority label.
pub fn sort_by_priority(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|left, right| left.priority.as_str().cmp(right.priority.as_str()));
    sorted
}

/// Applies one of the [`SortCriteria`].
pub fn sort(tasks: &[Task], criteria: SortCriteria, now_ms: i64) -> Vec<Task> {
    match criteria {
        SortCriteria::DueDate => sort_by_due_date(tasks, now_ms),
        SortCriteria::Priority => sort_by_priority(tasks),
    }
}

/// Splits tasks into `(completed, uncompleted)`, keeping relative order.
pub fn partition_completed(tasks: &[Task]) -> (Vec<Task>, Vec<Task>) {
    tasks.iter().cloned().partition(|task| task.is_completed)
}
