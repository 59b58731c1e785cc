//! Callback registry
//!
//! Process-wide state mapping an issued callback token to the suspended
//! execution waiting on it. The registry never owns executions; it only
//! holds the resumption channel each suspended dispatch task is parked on.
//!
//! Token consumption is removal under the registry lock, so exactly one of
//! {completion signal, timeout, cancellation} can ever claim a token; the
//! losers observe an already-consumed token and become silent no-ops.

use bosun_model::{CallbackToken, ExecutionId, Payload};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Outcome delivered to a suspended execution's dispatch task
#[derive(Debug)]
pub enum Resumption {
    /// A matching completion signal arrived with this result payload
    Completed(Payload),
    /// The execution was externally cancelled while suspended
    Cancelled,
}

struct Waiter {
    execution: ExecutionId,
    step: String,
    deadline: chrono::DateTime<chrono::Utc>,
    sender: oneshot::Sender<Resumption>,
}

/// Registry of outstanding callback waits
///
/// The only shared mutable structure in the engine; supports concurrent
/// insert, completion, expiry, and cancellation from multiple executions
/// without corrupting associations.
#[derive(Default)]
pub struct CallbackRegistry {
    waits: Mutex<HashMap<CallbackToken, Waiter>>,
}

impl CallbackRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an outstanding wait and return its resumption channel
    ///
    /// The token is live from this moment: a completion signal delivered
    /// immediately after the initiate call hands the token out will find it.
    pub fn register(
        &self,
        token: CallbackToken,
        execution: ExecutionId,
        step: impl Into<String>,
        timeout: Duration,
    ) -> oneshot::Receiver<Resumption> {
        let (sender, receiver) = oneshot::channel();
        let deadline = chrono::Utc::now()
            + chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::MAX);

        let waiter = Waiter {
            execution,
            step: step.into(),
            deadline,
            sender,
        };

        self.waits.lock().unwrap().insert(token, waiter);
        receiver
    }

    /// Deliver a completion signal
    ///
    /// Consumes the token and resumes the waiting execution. Returns false
    /// for an unknown or already-consumed token: duplicate deliveries are
    /// idempotent no-ops, logged but never surfaced as errors.
    pub fn complete(&self, token: &CallbackToken, payload: Payload) -> bool {
        match self.waits.lock().unwrap().remove(token) {
            Some(waiter) => {
                debug!(
                    %token,
                    execution = %waiter.execution,
                    step = %waiter.step,
                    "completion signal consumed token"
                );
                let _ = waiter.sender.send(Resumption::Completed(payload));
                true
            }
            None => {
                warn!(%token, "completion signal for unknown or consumed token, ignoring");
                false
            }
        }
    }

    /// Claim the token on behalf of its timeout
    ///
    /// Returns true if the token was still live (the timeout wins the
    /// race); false means a completion signal or cancellation got there
    /// first and its resumption is already in flight.
    pub fn expire(&self, token: &CallbackToken) -> bool {
        match self.waits.lock().unwrap().remove(token) {
            Some(waiter) => {
                debug!(
                    %token,
                    execution = %waiter.execution,
                    step = %waiter.step,
                    "wait timed out, token consumed"
                );
                true
            }
            None => false,
        }
    }

    /// Cancel the outstanding wait of an execution
    ///
    /// Consumes the execution's live token, if any, and delivers a
    /// cancellation resumption. Returns false when the execution has no
    /// outstanding wait.
    pub fn cancel_execution(&self, execution: ExecutionId) -> bool {
        let mut waits = self.waits.lock().unwrap();
        let token = waits
            .iter()
            .find(|(_, waiter)| waiter.execution == execution)
            .map(|(token, _)| *token);

        match token {
            Some(token) => {
                let waiter = waits.remove(&token).expect("token found under same lock");
                debug!(%token, execution = %execution, "wait cancelled, token consumed");
                let _ = waiter.sender.send(Resumption::Cancelled);
                true
            }
            None => false,
        }
    }

    /// Check whether a token is still live
    pub fn is_live(&self, token: &CallbackToken) -> bool {
        self.waits.lock().unwrap().contains_key(token)
    }

    /// Deadline of a live token
    pub fn deadline(&self, token: &CallbackToken) -> Option<chrono::DateTime<chrono::Utc>> {
        self.waits.lock().unwrap().get(token).map(|w| w.deadline)
    }

    /// Number of outstanding waits
    pub fn outstanding(&self) -> usize {
        self.waits.lock().unwrap().len()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("outstanding", &self.outstanding())
            .finish()
    }
}
