//! Request-id bookkeeping for weather fetches.
//!
//! # Responsibility
//! - Tag every fetch with a monotonically increasing request id.
//! - Carry a worker-thread result back to the state-owning context.
//!
//! # Invariants
//! - Only the newest issued request may update weather state; older
//!   completions are reported as stale and dropped.
//! - A request stops counting as in flight when its ticket is dropped,
//!   whether it was completed or abandoned.

use crate::model::weather::WeatherSnapshot;
use crate::weather::{WeatherError, WeatherResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

/// Proof that a fetch was started; handed back on completion.
///
/// Dropping the ticket, directly or through its [`PendingWeatherFetch`],
/// releases the request's in-flight slot.
#[derive(Debug)]
pub struct WeatherTicket {
    request_id: u64,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for WeatherTicket {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WeatherTicket {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }
}

/// What happened to one completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOutcome {
    /// Weather fields were replaced with this snapshot.
    Applied(WeatherSnapshot),
    /// The fetch failed; weather fields were left unchanged.
    Failed(WeatherError),
    /// A newer fetch was started after this one; the result was dropped.
    Stale { request_id: u64 },
}

/// A finished fetch waiting to be applied by the state owner.
#[derive(Debug)]
pub struct WeatherCompletion {
    pub ticket: WeatherTicket,
    pub result: WeatherResult<WeatherSnapshot>,
}

/// A fetch running on a worker thread.
#[derive(Debug)]
pub struct PendingWeatherFetch {
    ticket: WeatherTicket,
    receiver: Receiver<WeatherResult<WeatherSnapshot>>,
}

impl PendingWeatherFetch {
    pub(crate) fn new(
        ticket: WeatherTicket,
        receiver: Receiver<WeatherResult<WeatherSnapshot>>,
    ) -> Self {
        Self { ticket, receiver }
    }

    pub fn request_id(&self) -> u64 {
        self.ticket.request_id
    }

    /// Blocks until the worker reports.
    pub fn wait(self) -> WeatherCompletion {
        let result = self.receiver.recv().unwrap_or_else(|_| Err(worker_gone()));
        WeatherCompletion {
            ticket: self.ticket,
            result,
        }
    }

    /// Returns the completion if the worker has reported, otherwise `self`.
    pub fn try_take(self) -> Result<WeatherCompletion, Self> {
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return Err(self),
            Err(TryRecvError::Disconnected) => Err(worker_gone()),
        };
        Ok(WeatherCompletion {
            ticket: self.ticket,
            result,
        })
    }
}

fn worker_gone() -> WeatherError {
    WeatherError::Transport("weather worker stopped before reporting".to_string())
}

/// In-flight accounting owned by the view-model.
#[derive(Debug, Default)]
pub(crate) struct WeatherRequests {
    latest_issued: u64,
    in_flight: Arc<AtomicUsize>,
}

impl WeatherRequests {
    pub(crate) fn issue(&mut self) -> WeatherTicket {
        self.latest_issued += 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        WeatherTicket {
            request_id: self.latest_issued,
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Retires a ticket; returns whether it is still the newest request.
    pub(crate) fn retire(&self, ticket: WeatherTicket) -> bool {
        ticket.request_id == self.latest_issued
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}
