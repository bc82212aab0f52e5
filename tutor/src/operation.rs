//! Request lifecycle tracking shared by every operation kind.
//!
//! One [`Operation`] per (caller, operation kind). A new request may start while another
//! is pending; nothing is cancelled and whichever settles last is what the state shows.
//! `reset()` returns to `Idle` and causes requests started before it to settle silently.

use serde::Serialize;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::error::TutorResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum OperationState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(String),
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        OperationState::Idle
    }
}

/// Handle for one request cycle, returned by [`Operation::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
}

#[derive(Debug)]
struct Inner<T> {
    state: OperationState<T>,
    epoch: u64,
}

#[derive(Debug)]
pub struct Operation<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Default for Operation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Operation<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: OperationState::Idle,
                epoch: 0,
            }),
        }
    }

    pub fn state(&self) -> OperationState<T> {
        self.lock().state.clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.lock().state, OperationState::Pending)
    }

    pub fn result(&self) -> Option<T> {
        match &self.lock().state {
            OperationState::Succeeded(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<String> {
        match &self.lock().state {
            OperationState::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Enters `Pending` from any state, discarding the previous result or error.
    pub fn start(&self) -> Ticket {
        let mut inner = self.lock();
        inner.state = OperationState::Pending;
        Ticket { epoch: inner.epoch }
    }

    /// Records the outcome of a request. Returns false when a reset happened after the
    /// request started, in which case the outcome is ignored.
    pub fn settle(&self, ticket: Ticket, outcome: &TutorResult<T>) -> bool {
        let mut inner = self.lock();
        if inner.epoch != ticket.epoch {
            debug!("Ignoring outcome of a request started before reset");
            return false;
        }
        inner.state = match outcome {
            Ok(value) => OperationState::Succeeded(value.clone()),
            Err(e) => OperationState::Failed(e.to_string()),
        };
        true
    }

    /// Back to `Idle` with no result or error.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state = OperationState::Idle;
        inner.epoch += 1;
    }

    /// Runs one full request cycle around `request`.
    pub async fn run<F>(&self, request: F) -> TutorResult<T>
    where
        F: Future<Output = TutorResult<T>>,
    {
        let ticket = self.start();
        let outcome = request.await;
        self.settle(ticket, &outcome);
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TutorError;
    use std::sync::Arc;
    use std::time::Duration;

    fn unavailable() -> TutorError {
        TutorError::ModelUnavailable("network down".to_string())
    }

    #[test]
    fn test_transitions() {
        let op: Operation<String> = Operation::new();
        assert_eq!(op.state(), OperationState::Idle);

        let ticket = op.start();
        assert!(op.is_pending());
        assert!(op.settle(ticket, &Ok("hecho".to_string())));
        assert_eq!(op.result().as_deref(), Some("hecho"));
        assert_eq!(op.error(), None);

        let ticket = op.start();
        assert_eq!(op.result(), None);
        op.settle(ticket, &Err(unavailable()));
        assert_eq!(op.state(), OperationState::Failed("network down".to_string()));

        let ticket = op.start();
        op.settle(ticket, &Ok("otra vez".to_string()));
        assert_eq!(op.error(), None);
        assert_eq!(op.result().as_deref(), Some("otra vez"));
    }

    #[test]
    fn test_reset_from_any_state_is_idle() {
        let op: Operation<u32> = Operation::new();
        op.reset();
        assert_eq!(op.state(), OperationState::Idle);

        op.start();
        op.reset();
        assert_eq!(op.state(), OperationState::Idle);

        let ticket = op.start();
        op.settle(ticket, &Ok(1));
        op.reset();
        assert_eq!(op.state(), OperationState::Idle);

        let ticket = op.start();
        op.settle(ticket, &Err(unavailable()));
        op.reset();
        op.reset();
        assert_eq!(op.state(), OperationState::Idle);
        assert_eq!(op.result(), None);
        assert_eq!(op.error(), None);
    }

    #[test]
    fn test_outcome_after_reset_is_ignored() {
        let op: Operation<u32> = Operation::new();
        let stale = op.start();
        op.reset();
        assert!(!op.settle(stale, &Ok(7)));
        assert_eq!(op.state(), OperationState::Idle);

        let fresh = op.start();
        assert!(!op.settle(stale, &Err(unavailable())));
        assert!(op.is_pending());
        assert!(op.settle(fresh, &Ok(8)));
        assert_eq!(op.result(), Some(8));
    }

    #[tokio::test]
    async fn test_overlapping_requests_last_write_wins() {
        let op: Arc<Operation<&'static str>> = Arc::new(Operation::new());

        let slow = {
            let op = op.clone();
            tokio::spawn(async move {
                op.run(async {
                    tokio::time::sleep(Duration::from_millis(60)).await;
                    Ok("lenta")
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let fast = op.run(async { Ok("rápida") }).await;
        assert_eq!(fast, Ok("rápida"));
        assert_eq!(op.result(), Some("rápida"));

        assert_eq!(slow.await.unwrap(), Ok("lenta"));
        assert_eq!(op.result(), Some("lenta"));
    }

    #[test]
    fn test_state_serializes_as_tagged_union() {
        let value = serde_json::to_value(OperationState::Succeeded(3)).unwrap();
        assert_eq!(value, serde_json::json!({"status": "succeeded", "value": 3}));
        let idle = serde_json::to_value(OperationState::<u8>::Idle).unwrap();
        assert_eq!(idle, serde_json::json!({"status": "idle"}));
    }
}
