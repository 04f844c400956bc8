//! View-model orchestration.
//!
//! # Responsibility
//! - Orchestrate store, query engine and weather client into the
//!   presentation-facing task list state.
//! - Keep presentation layers decoupled from storage and HTTP details.

pub mod task_view_model;
pub mod weather_fetch;
