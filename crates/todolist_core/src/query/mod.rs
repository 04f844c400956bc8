//! In-memory task query engine.
//!
//! # Responsibility
//! - Filter, sort and partition a snapshot of loaded tasks.
//!
//! # Invariants
//! - Functions are pure: they never touch the store and never mutate input.
//! - All orderings are stable.

pub mod clock;
pub mod task_query;

pub use clock::{Clock, FixedClock, SystemClock};
pub use task_query::{
    partition_completed, search, sort, sort_by_due_date, sort_by_priority, SortCriteria,
};
