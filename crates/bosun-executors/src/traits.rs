//! Executor trait definition
//!
//! This module defines the core Executor trait implemented by the external
//! business logic the orchestrator sequences. Executors receive the
//! execution's payload and return a replacement payload, or a typed
//! failure. Retries, if any, are the executor's own responsibility.

use crate::context::ExecutorContext;
use crate::error::{ExecutorError, Result};
use async_trait::async_trait;
use bosun_model::{CallbackToken, Payload};
use std::sync::Mutex;
use std::time::Duration;

/// Core trait for external executors
///
/// An executor is a named, opaque function the orchestrator calls when
/// dispatching a step: synchronously for invoke steps, and as the
/// initiation call for callback-wait steps (where the context carries the
/// freshly minted token for the external actor to return).
///
/// # Example
///
/// ```ignore
/// use bosun_executors::{Executor, ExecutorContext, Result};
/// use bosun_model::Payload;
/// use async_trait::async_trait;
///
/// struct TagInstance;
///
/// #[async_trait]
/// impl Executor for TagInstance {
///     fn name(&self) -> &str {
///         "tag-instance"
///     }
///
///     fn description(&self) -> &str {
///         "Tags the launched instance as managed"
///     }
///
///     async fn execute(&self, ctx: &ExecutorContext) -> Result<Payload> {
///         Ok(ctx.payload().clone().with("managedBy", "bosun"))
///     }
/// }
/// ```
#[async_trait]
pub trait Executor: Send + Sync {
    /// Get the executor name (used for registration and lookup)
    fn name(&self) -> &str;

    /// Get a human-readable description of the executor
    fn description(&self) -> &str;

    /// Invoke the executor
    ///
    /// The returned payload replaces the execution's payload for invoke
    /// steps; for wait initiations the output is discarded and only the
    /// completion signal's payload matters.
    async fn execute(&self, ctx: &ExecutorContext) -> Result<Payload>;

    /// Get the default timeout for this executor
    ///
    /// If not overridden, calls have no timeout (wait forever).
    fn default_timeout(&self) -> Option<Duration> {
        None
    }

    /// Validate the input payload before execution
    ///
    /// Called before execute() to check that the executor's input contract
    /// holds. Returns an error if validation fails.
    fn validate(&self, ctx: &ExecutorContext) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// An executor that returns its input unchanged (for testing)
pub struct NoopExecutor {
    name: String,
}

impl NoopExecutor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Executor for NoopExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Forwards its input payload unchanged (for testing)"
    }

    async fn execute(&self, ctx: &ExecutorContext) -> Result<Payload> {
        Ok(ctx.payload().clone())
    }
}

/// An executor that returns a fixed payload (for testing)
pub struct StaticExecutor {
    name: String,
    output: Payload,
}

impl StaticExecutor {
    pub fn new(name: impl Into<String>, output: Payload) -> Self {
        Self {
            name: name.into(),
            output,
        }
    }
}

#[async_trait]
impl Executor for StaticExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns a fixed payload regardless of input (for testing)"
    }

    async fn execute(&self, _ctx: &ExecutorContext) -> Result<Payload> {
        Ok(self.output.clone())
    }
}

/// An executor that always fails (for testing error handling)
pub struct FailingExecutor {
    name: String,
    error_message: String,
}

impl FailingExecutor {
    pub fn new(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error_message: error_message.into(),
        }
    }
}

#[async_trait]
impl Executor for FailingExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "An executor that always fails (for testing)"
    }

    async fn execute(&self, _ctx: &ExecutorContext) -> Result<Payload> {
        Err(ExecutorError::ExecutionFailed(self.error_message.clone()))
    }
}

/// An executor that sleeps for a specified duration (for testing timeouts)
pub struct SleepExecutor {
    name: String,
    duration: Duration,
}

impl SleepExecutor {
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

#[async_trait]
impl Executor for SleepExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Sleeps for a specified duration, then forwards its input (for testing)"
    }

    async fn execute(&self, ctx: &ExecutorContext) -> Result<Payload> {
        tokio::time::sleep(self.duration).await;
        Ok(ctx.payload().clone())
    }
}

/// One observed call to a [`RecordingExecutor`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Step that dispatched the call
    pub step: String,

    /// Input payload at call time
    pub payload: Payload,

    /// Callback token, when the call was a wait initiation
    pub callback_token: Option<CallbackToken>,
}

/// An executor that records every call it receives (for testing)
///
/// Useful for observing rollback-path invocations and for capturing the
/// token minted for a wait initiation so a test can deliver the matching
/// completion signal.
#[derive(Default)]
pub struct RecordingExecutor {
    name: String,
    output: Payload,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingExecutor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: Payload::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the payload returned from every call
    pub fn with_output(mut self, output: Payload) -> Self {
        self.output = output;
        self
    }

    /// All calls observed so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls observed so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The most recently observed callback token, if any call carried one
    pub fn last_token(&self) -> Option<CallbackToken> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|call| call.callback_token)
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Records every call it receives (for testing)"
    }

    async fn execute(&self, ctx: &ExecutorContext) -> Result<Payload> {
        self.calls.lock().unwrap().push(RecordedCall {
            step: ctx.step().to_string(),
            payload: ctx.payload().clone(),
            callback_token: ctx.callback_token(),
        });
        Ok(self.output.clone())
    }
}
