//! Task list view-model.
//!
//! # Responsibility
//! - Own the loaded task list and its derived filtered/sorted view.
//! - Route mutations to the repository and weather lookups to the client.
//! - Publish immutable [`TaskListState`] snapshots to subscribers.
//!
//! # Invariants
//! - `tasks` is a cached copy; `update` and `toggle_completion` persist but
//!   do not refresh it. Callers reload to observe those changes.
//! - `search`/`sort` replace `filtered_tasks` only and never touch the store.
//! - Weather failures are logged and leave prior weather fields unchanged.
//! - Only the newest weather request may update weather fields.

use crate::model::task::{Task, TaskDraft, TaskId};
use crate::model::weather::{Coordinate, WeatherSnapshot};
use crate::query::{self, Clock, SortCriteria, SystemClock};
use crate::repo::task_repo::{RepoResult, TaskRepository};
use crate::service::weather_fetch::{
    PendingWeatherFetch, WeatherOutcome, WeatherRequests, WeatherTicket,
};
use crate::weather::{WeatherClient, WeatherResult};
use log::{error, info, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// Observable view-model state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskListState {
    pub tasks: Vec<Task>,
    pub filtered_tasks: Vec<Task>,
    /// Last accepted weather snapshot, if any.
    pub weather: Option<WeatherSnapshot>,
    pub is_loading: bool,
}

/// Stateful orchestrator between presentation, store and weather client.
pub struct TaskViewModel<R, W, C = SystemClock> {
    repo: R,
    weather_client: Arc<W>,
    clock: C,
    state: TaskListState,
    weather_requests: WeatherRequests,
    subscribers: Vec<Sender<Arc<TaskListState>>>,
}

impl<R, W> TaskViewModel<R, W, SystemClock>
where
    R: TaskRepository,
    W: WeatherClient,
{
    /// Creates a view-model and performs the initial load.
    pub fn new(repo: R, weather_client: W) -> RepoResult<Self> {
        Self::with_clock(repo, weather_client, SystemClock)
    }
}

impl<R, W, C> TaskViewModel<R, W, C>
where
    R: TaskRepository,
    W: WeatherClient,
    C: Clock,
{
    /// Creates a view-model with an explicit clock for due-date ordering.
    pub fn with_clock(repo: R, weather_client: W, clock: C) -> RepoResult<Self> {
        let mut view_model = Self {
            repo,
            weather_client: Arc::new(weather_client),
            clock,
            state: TaskListState::default(),
            weather_requests: WeatherRequests::default(),
            subscribers: Vec::new(),
        };
        view_model.load()?;
        Ok(view_model)
    }

    /// State as of the last published snapshot.
    pub fn state(&self) -> &TaskListState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn filtered_tasks(&self) -> &[Task] {
        &self.state.filtered_tasks
    }

    pub fn completed_tasks(&self) -> Vec<Task> {
        query::partition_completed(&self.state.tasks).0
    }

    pub fn uncompleted_tasks(&self) -> Vec<Task> {
        query::partition_completed(&self.state.tasks).1
    }

    /// Condition text of the last accepted snapshot, or `""`.
    pub fn weather_description(&self) -> &str {
        self.state
            .weather
            .as_ref()
            .map_or("", |snapshot| snapshot.condition_text.as_str())
    }

    /// Temperature of the last accepted snapshot, or `0.0`.
    pub fn temperature(&self) -> f64 {
        self.state
            .weather
            .as_ref()
            .map_or(0.0, |snapshot| snapshot.temperature_celsius)
    }

    /// Location of the last accepted snapshot, or `""`.
    pub fn location_name(&self) -> &str {
        self.state
            .weather
            .as_ref()
            .map_or("", |snapshot| snapshot.location_name.as_str())
    }

    /// True while any weather request is in flight.
    ///
    /// Abandoned requests stop counting as soon as their ticket is dropped.
    pub fn is_loading(&self) -> bool {
        self.weather_requests.is_loading()
    }

    /// Registers a subscriber that receives a snapshot after every change.
    ///
    /// Dropping the receiver unsubscribes it on the next publish.
    pub fn subscribe(&mut self) -> Receiver<Arc<TaskListState>> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Reloads every task from the store and clears any active filter.
    pub fn load(&mut self) -> RepoResult<()> {
        let tasks = self.repo.list_tasks().map_err(|err| {
            error!("event=task_load module=view_model status=error error={err}");
            err
        })?;
        info!(
            "event=task_load module=view_model status=ok count={}",
            tasks.len()
        );
        self.state.filtered_tasks = tasks.clone();
        self.state.tasks = tasks;
        self.publish();
        Ok(())
    }

    /// Persists a new task and appends it to the cached list.
    ///
    /// Title validation is the caller's job (`TaskDraft::validate`).
    pub fn add(&mut self, draft: TaskDraft) -> RepoResult<TaskId> {
        let id = self.repo.create_task(&draft).map_err(|err| {
            error!("event=task_create module=view_model status=error error={err}");
            err
        })?;
        info!("event=task_create module=view_model status=ok task_id={id}");

        self.state.tasks.push(draft.into_task(id));
        self.state.filtered_tasks = self.state.tasks.clone();
        self.publish();
        Ok(id)
    }

    /// Persists new field values without refreshing cached lists.
    pub fn update(&mut self, id: TaskId, draft: &TaskDraft) -> RepoResult<()> {
        self.repo.update_task(id, draft).map_err(|err| {
            error!("event=task_update module=view_model status=error task_id={id} error={err}");
            err
        })?;
        info!("event=task_update module=view_model status=ok task_id={id}");
        Ok(())
    }

    /// Flips the stored completion flag and returns the new value.
    ///
    /// Cached lists are not refreshed.
    pub fn toggle_completion(&mut self, id: TaskId) -> RepoResult<bool> {
        let flipped = self
            .repo
            .get_task(id)
            .and_then(|task| {
                let flipped = !task.is_completed;
                self.repo.set_completed(id, flipped).map(|()| flipped)
            })
            .map_err(|err| {
                error!(
                    "event=task_toggle module=view_model status=error task_id={id} error={err}"
                );
                err
            })?;
        info!(
            "event=task_toggle module=view_model status=ok task_id={id} is_completed={flipped}"
        );
        Ok(flipped)
    }

    /// Deletes a task and reloads the full list.
    pub fn delete(&mut self, id: TaskId) -> RepoResult<()> {
        self.repo.delete_task(id).map_err(|err| {
            error!("event=task_delete module=view_model status=error task_id={id} error={err}");
            err
        })?;
        info!("event=task_delete module=view_model status=ok task_id={id}");
        self.load()
    }

    /// Filters the cached list by title; empty query shows everything.
    pub fn search(&mut self, text: &str) {
        self.state.filtered_tasks = query::search(&self.state.tasks, text);
        self.publish();
    }

    /// Reorders the current filtered view.
    pub fn sort(&mut self, criteria: SortCriteria) {
        self.state.filtered_tasks = query::sort(
            &self.state.filtered_tasks,
            criteria,
            self.clock.now_epoch_ms(),
        );
        self.publish();
    }

    /// Marks a new weather request as in flight.
    ///
    /// The caller runs the fetch and hands the result to
    /// [`Self::complete_weather_fetch`].
    pub fn begin_weather_fetch(&mut self) -> WeatherTicket {
        let ticket = self.weather_requests.issue();
        info!(
            "event=weather_fetch module=view_model status=start request_id={}",
            ticket.request_id()
        );
        self.publish();
        ticket
    }

    /// Applies the result of a fetch started with [`Self::begin_weather_fetch`].
    pub fn complete_weather_fetch(
        &mut self,
        ticket: WeatherTicket,
        result: WeatherResult<WeatherSnapshot>,
    ) -> WeatherOutcome {
        let request_id = ticket.request_id();
        let is_current = self.weather_requests.retire(ticket);

        let outcome = if !is_current {
            info!("event=weather_stale module=view_model status=dropped request_id={request_id}");
            WeatherOutcome::Stale { request_id }
        } else {
            match result {
                Ok(snapshot) => {
                    info!(
                        "event=weather_fetch module=view_model status=ok request_id={request_id}"
                    );
                    self.state.weather = Some(snapshot.clone());
                    WeatherOutcome::Applied(snapshot)
                }
                Err(err) => {
                    warn!(
                        "event=weather_fetch module=view_model status=error request_id={request_id} error_code={} error={err}",
                        err.code()
                    );
                    WeatherOutcome::Failed(err)
                }
            }
        };

        self.publish();
        outcome
    }

    /// Fetches weather on the calling thread.
    pub fn fetch_weather(&mut self, coordinate: Coordinate) -> WeatherOutcome {
        let ticket = self.begin_weather_fetch();
        let result = self.weather_client.fetch(coordinate);
        self.complete_weather_fetch(ticket, result)
    }

    /// Starts a fetch on a worker thread.
    ///
    /// The owner later passes the completion to
    /// [`Self::complete_weather_fetch`] on its own thread.
    pub fn spawn_weather_fetch(&mut self, coordinate: Coordinate) -> PendingWeatherFetch
    where
        W: 'static,
    {
        let ticket = self.begin_weather_fetch();
        let (sender, receiver) = mpsc::channel();
        let client = Arc::clone(&self.weather_client);

        let spawned = thread::Builder::new()
            .name("weather-fetch".to_string())
            .spawn(move || {
                // The receiver may already be gone; nothing to report then.
                let _ = sender.send(client.fetch(coordinate));
            });
        if let Err(err) = spawned {
            error!(
                "event=weather_fetch module=view_model status=error request_id={} error_code=spawn_failed error={err}",
                ticket.request_id()
            );
        }

        PendingWeatherFetch::new(ticket, receiver)
    }

    fn publish(&mut self) {
        self.state.is_loading = self.weather_requests.is_loading();
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = Arc::new(self.state.clone());
        self.subscribers
            .retain(|subscriber| subscriber.send(Arc::clone(&snapshot)).is_ok());
    }
}
