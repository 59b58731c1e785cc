//! Executor invocation context
//!
//! The context carries everything an executor may need: the identity of the
//! calling execution and step, the current payload, and, for callback-wait
//! initiations, the token the external actor must return with its
//! completion signal.

use bosun_model::{CallbackToken, ExecutionId, Payload};
use std::time::Duration;

/// Context provided to executors during invocation
#[derive(Debug, Clone)]
pub struct ExecutorContext {
    /// Execution this call belongs to
    execution: ExecutionId,

    /// Definition the execution is running
    definition: String,

    /// Step being dispatched
    step: String,

    /// Current execution payload
    payload: Payload,

    /// Callback token, present only for callback-wait initiations
    callback_token: Option<CallbackToken>,

    /// Per-call timeout
    timeout: Option<Duration>,
}

impl ExecutorContext {
    /// Create a new context
    pub fn new(
        execution: ExecutionId,
        definition: impl Into<String>,
        step: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            execution,
            definition: definition.into(),
            step: step.into(),
            payload,
            callback_token: None,
            timeout: None,
        }
    }

    /// Attach the callback token for a wait initiation
    pub fn with_callback_token(mut self, token: CallbackToken) -> Self {
        self.callback_token = Some(token);
        self
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the execution id
    pub fn execution(&self) -> ExecutionId {
        self.execution
    }

    /// Get the definition id
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Get the step id
    pub fn step(&self) -> &str {
        &self.step
    }

    /// Get the input payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Get the callback token, if this is a wait initiation
    pub fn callback_token(&self) -> Option<CallbackToken> {
        self.callback_token
    }

    /// Get the per-call timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
