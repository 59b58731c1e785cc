//! Execution records and callback tokens
//!
//! An `Execution` is the mutable state of one run of a workflow definition.
//! It is owned by the orchestrator; stores and status queries see snapshots.

use crate::payload::Payload;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one execution of a workflow definition
pub type ExecutionId = Uuid;

/// Opaque single-use token correlating a suspended wait with its
/// eventual external completion signal
///
/// At most one live execution is associated with a given token; the token
/// is consumed exactly once, by a completion signal, a timeout, or a
/// cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackToken(Uuid);

impl CallbackToken {
    /// Mint a fresh token
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CallbackToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// State of one run of a workflow definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Unique execution id
    pub id: ExecutionId,

    /// Id of the definition being run
    pub definition: String,

    /// Current status
    pub status: ExecutionStatus,

    /// Current payload
    pub payload: Payload,

    /// Step currently being dispatched or waited on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,

    /// Originating failure, once the execution has failed or been routed
    /// onto a catch path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureInfo>,

    /// Start time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Completion time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Execution {
    /// Create a new running execution positioned at the start step
    pub fn new(definition: impl Into<String>, payload: Payload, start_step: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            definition: definition.into(),
            status: ExecutionStatus::Running,
            payload,
            current_step: Some(start_step.into()),
            failure: None,
            started_at: Some(chrono::Utc::now()),
            completed_at: None,
        }
    }

    /// Check whether the execution has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ExecutionStatus::Succeeded | ExecutionStatus::Failed
        )
    }

    /// Check whether the execution is running
    pub fn is_running(&self) -> bool {
        matches!(self.status, ExecutionStatus::Running)
    }

    /// Check whether the execution is suspended on a callback wait
    pub fn is_suspended(&self) -> bool {
        matches!(self.status, ExecutionStatus::Suspended)
    }

    /// Mark the execution suspended
    pub fn suspend(&mut self) {
        self.status = ExecutionStatus::Suspended;
    }

    /// Mark the execution running again after a suspension
    pub fn resume(&mut self) {
        self.status = ExecutionStatus::Running;
    }

    /// Mark the execution terminally succeeded
    pub fn succeed(&mut self) {
        self.status = ExecutionStatus::Succeeded;
        self.completed_at = Some(chrono::Utc::now());
    }

    /// Mark the execution terminally failed
    pub fn fail(&mut self) {
        self.status = ExecutionStatus::Failed;
        self.completed_at = Some(chrono::Utc::now());
    }

    /// Record the originating failure
    pub fn record_failure(&mut self, failure: FailureInfo) {
        self.failure = Some(failure);
    }
}

/// Execution status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Actively dispatching steps
    #[default]
    Running,
    /// Parked on a callback wait
    Suspended,
    /// Reached the success terminal
    Succeeded,
    /// Reached the fail terminal
    Failed,
}

/// Description of the failure that drove an execution onto its failure path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailureInfo {
    /// Failure kind
    pub kind: FailureKind,

    /// Human-readable description
    pub message: String,
}

impl FailureInfo {
    /// An executor call returned an error
    pub fn executor(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Executor,
            message: message.into(),
        }
    }

    /// A callback wait's deadline elapsed with no signal
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: message.into(),
        }
    }

    /// The execution was externally cancelled while suspended
    pub fn cancelled() -> Self {
        Self {
            kind: FailureKind::Cancelled,
            message: "execution cancelled".to_string(),
        }
    }
}

/// Failure kind taxonomy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// An invoke or initiate call returned an error
    Executor,
    /// A callback wait timed out
    Timeout,
    /// A user-directed abort of a suspended execution
    Cancelled,
}
