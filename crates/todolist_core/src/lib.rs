//! Core data layer for the TodoList app.
//! Owns task persistence, in-memory task queries, the weather lookup and the
//! view-model that presentation layers observe.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod weather;

pub use config::{ConfigError, WeatherConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Priority, Task, TaskDraft, TaskId, TaskValidationError};
pub use model::weather::{Coordinate, WeatherSnapshot};
pub use query::{Clock, FixedClock, SortCriteria, SystemClock};
pub use repo::notify::{ListenerId, TaskChange, TaskChangeHub};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::task_view_model::{TaskListState, TaskViewModel};
pub use service::weather_fetch::{
    PendingWeatherFetch, WeatherCompletion, WeatherOutcome, WeatherTicket,
};
pub use weather::{HttpWeatherClient, WeatherClient, WeatherError, WeatherResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
