//! "Tasks changed" notification fan-out.
//!
//! # Responsibility
//! - Let components outside the store observe every successful mutation.
//!
//! # Invariants
//! - Listeners are invoked synchronously, in registration order, after the
//!   write has been committed.
//! - A listener is never invoked while the registry lock is held by a
//!   registration call from the same thread.

use crate::model::task::TaskId;
use std::sync::{Arc, Mutex, PoisonError};

type Listener = Arc<dyn Fn(&TaskChange) + Send + Sync>;

/// One committed store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskChange {
    Created(TaskId),
    Updated(TaskId),
    CompletionToggled { id: TaskId, is_completed: bool },
    Deleted(TaskId),
}

/// Handle returned by [`TaskChangeHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

/// Shared listener registry. Cheap to clone; clones share listeners.
#[derive(Clone, Default)]
pub struct TaskChangeHub {
    inner: Arc<Mutex<Registry>>,
}

impl TaskChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for all future changes.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&TaskChange) + Send + Sync + 'static,
    {
        let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = ListenerId(registry.next_id);
        registry.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` when the id is unknown.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let before = registry.listeners.len();
        registry.listeners.retain(|(existing, _)| *existing != id);
        registry.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    /// Delivers one change to every registered listener.
    pub fn broadcast(&self, change: TaskChange) {
        // Listeners may subscribe or unsubscribe re-entrantly.
        let listeners = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect::<Vec<_>>();

        for listener in listeners {
            listener(&change);
        }
    }
}

impl std::fmt::Debug for TaskChangeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskChangeHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
