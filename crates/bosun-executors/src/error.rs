//! Error types for executor calls

use std::time::Duration;
use thiserror::Error;

/// Error type for executor invocation
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// No executor registered under the requested name
    #[error("executor not found: {0}")]
    NotFound(String),

    /// The executor ran and returned a failure
    #[error("executor failed: {0}")]
    ExecutionFailed(String),

    /// The executor did not return within its timeout
    #[error("executor timed out after {0:?}")]
    Timeout(Duration),

    /// The input payload did not satisfy the executor's contract
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Pre-execution validation failed
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, ExecutorError>;
