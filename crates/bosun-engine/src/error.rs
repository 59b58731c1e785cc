//! Error types for workflow orchestration

use bosun_executors::ExecutorError;
use bosun_model::{ExecutionId, ModelError};
use std::time::Duration;
use thiserror::Error;

/// Error type for orchestrator operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Definition not found
    #[error("definition not found: {0}")]
    DefinitionNotFound(String),

    /// Execution not found
    #[error("execution not found: {0}")]
    ExecutionNotFound(ExecutionId),

    /// A definition referenced a step that does not exist
    ///
    /// Definitions are validated at registration, so this indicates a
    /// corrupted store.
    #[error("definition '{definition}' references unknown step '{step}'")]
    UnknownStep { definition: String, step: String },

    /// A step's executor call failed
    #[error("step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: ExecutorError,
    },

    /// A callback wait elapsed with no completion signal
    #[error("step '{step}' timed out waiting for callback after {timeout:?}")]
    WaitTimeout { step: String, timeout: Duration },

    /// Cancellation target is not suspended on a callback wait
    #[error("execution {0} is not suspended")]
    NotSuspended(ExecutionId),

    /// Cancellation target has already reached a terminal state
    #[error("execution {0} has already completed")]
    AlreadyCompleted(ExecutionId),

    /// The resumption channel closed without delivering an outcome
    #[error("resumption channel closed for execution {0}")]
    ResumptionChannelClosed(ExecutionId),

    /// A definition failed validation at registration
    #[error("invalid definition: {0}")]
    InvalidDefinition(#[from] ModelError),

    /// State store error
    #[error("state store error: {0}")]
    StateStore(String),
}

/// Result type for orchestrator operations
pub type Result<T> = std::result::Result<T, EngineError>;
