//! Per-request lifecycle: `Idle -> Pending -> Succeeded | Failed`.
//!
//! Each `begin` hands out a [`Ticket`] tagged with the slot generation. A
//! completion is applied only while its ticket is current, so results from a
//! superseded call or from a screen that was unmounted in the meantime are
//! dropped.

use thiserror::Error;

use crate::error::RequestError;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(RequestError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("a request is already in flight for this control")]
    AlreadyPending,
}

#[derive(Debug, Clone)]
pub struct RequestSlot<T> {
    state: RequestState<T>,
    generation: u64,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            state: RequestState::Idle,
            generation: 0,
        }
    }
}

impl<T> RequestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, RequestState::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            RequestState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RequestError> {
        match &self.state {
            RequestState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Opens a new invocation, discarding any previous result.
    pub fn begin(&mut self) -> Result<Ticket, LifecycleError> {
        if self.is_pending() {
            return Err(LifecycleError::AlreadyPending);
        }
        self.generation += 1;
        self.state = RequestState::Pending;
        Ok(Ticket(self.generation))
    }

    pub fn complete(&mut self, ticket: Ticket, outcome: Result<T, RequestError>) -> Completion {
        if ticket.0 != self.generation || !self.is_pending() {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "discarding stale request completion"
            );
            return Completion::Discarded;
        }

        match outcome {
            Ok(value) => self.state = RequestState::Succeeded(value),
            // A cancelled call leaves nothing to show; the control becomes usable again.
            Err(RequestError::Cancelled) => {
                self.state = RequestState::Idle;
                return Completion::Discarded;
            }
            Err(err) => self.state = RequestState::Failed(err),
        }
        Completion::Applied
    }

    /// Returns to `Idle` and invalidates every outstanding ticket.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = RequestState::Idle;
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
