//! Step and transition types
//!
//! A step is one node in a definition's transition graph. Invoke steps call
//! an executor and move on; callback-wait steps call an executor to initiate
//! an external operation, then suspend the execution until a completion
//! signal or a timeout.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One node in a workflow's transition graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Step id, unique within a definition
    pub id: String,

    /// Name of the executor this step calls
    pub executor: String,

    /// Step kind and kind-specific configuration
    #[serde(flatten)]
    pub kind: StepKind,

    /// Transition taken on success; absent means the execution succeeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Target>,

    /// Transition taken on failure, in place of `next`; absent means an
    /// unhandled failure is fatal to the execution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch: Option<Target>,
}

impl Step {
    /// Create a synchronous invoke step
    pub fn invoke(id: impl Into<String>, executor: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            executor: executor.into(),
            kind: StepKind::Invoke,
            next: None,
            catch: None,
        }
    }

    /// Create a callback-wait step with the given wait timeout
    pub fn callback_wait(
        id: impl Into<String>,
        executor: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            executor: executor.into(),
            kind: StepKind::CallbackWait {
                timeout_seconds: timeout.as_secs(),
            },
            next: None,
            catch: None,
        }
    }

    /// Set the success transition
    pub fn with_next(mut self, target: Target) -> Self {
        self.next = Some(target);
        self
    }

    /// Set the failure transition
    pub fn with_catch(mut self, target: Target) -> Self {
        self.catch = Some(target);
        self
    }

    /// Check whether this is a callback-wait step
    pub fn is_wait(&self) -> bool {
        matches!(self.kind, StepKind::CallbackWait { .. })
    }

    /// Get the wait timeout, if this is a callback-wait step
    pub fn wait_timeout(&self) -> Option<Duration> {
        match self.kind {
            StepKind::CallbackWait { timeout_seconds } => {
                Some(Duration::from_secs(timeout_seconds))
            }
            StepKind::Invoke => None,
        }
    }
}

/// Step kind
///
/// Timeouts are stored as integral seconds so definitions stay trivially
/// serializable; convert with [`Step::wait_timeout`] at the point of use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StepKind {
    /// Call the executor synchronously and forward its output
    Invoke,

    /// Call the executor to initiate an external operation, then suspend
    /// until a completion signal arrives or the timeout elapses
    #[serde(rename_all = "camelCase")]
    CallbackWait {
        /// Maximum time to stay suspended waiting for the signal
        timeout_seconds: u64,
    },
}

/// Transition target: another step or one of the two terminal nodes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Target {
    /// Transition to the named step
    Step(String),
    /// Terminate the execution successfully
    Succeed,
    /// Terminate the execution as failed
    Fail,
}

impl Target {
    /// Create a step target
    pub fn step(id: impl Into<String>) -> Self {
        Target::Step(id.into())
    }

    /// Get the step id, if this targets a step
    pub fn step_id(&self) -> Option<&str> {
        match self {
            Target::Step(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_invoke() {
        let step = Step::invoke("provision", "provision-server")
            .with_next(Target::step("wait-for-bootstrap"));

        assert_eq!(step.id, "provision");
        assert_eq!(step.executor, "provision-server");
        assert!(!step.is_wait());
        assert_eq!(step.wait_timeout(), None);
        assert_eq!(step.next, Some(Target::step("wait-for-bootstrap")));
        assert_eq!(step.catch, None);
    }

    #[test]
    fn test_step_callback_wait() {
        let step = Step::callback_wait("wait-for-bootstrap", "enqueue-token", Duration::from_secs(3600))
            .with_next(Target::Succeed)
            .with_catch(Target::step("rollback"));

        assert!(step.is_wait());
        assert_eq!(step.wait_timeout(), Some(Duration::from_secs(3600)));
        assert_eq!(step.catch, Some(Target::step("rollback")));
    }

    #[test]
    fn test_target_step_id() {
        assert_eq!(Target::step("a").step_id(), Some("a"));
        assert_eq!(Target::Succeed.step_id(), None);
        assert_eq!(Target::Fail.step_id(), None);
    }

    #[test]
    fn test_step_serialization() {
        let step = Step::callback_wait("wait", "enqueue-token", Duration::from_secs(60))
            .with_next(Target::step("finish"))
            .with_catch(Target::Fail);

        let json = serde_json::to_string(&step).unwrap();
        let parsed: Step = serde_json::from_str(&json).unwrap();

        assert_eq!(step, parsed);
        assert!(json.contains("\"kind\":\"callbackWait\""));
        assert!(json.contains("\"timeoutSeconds\":60"));
    }

    #[test]
    fn test_step_deserializes_wire_format() {
        let json = r#"{
            "id": "wait-for-download",
            "executor": "enqueue-token",
            "kind": "callbackWait",
            "timeoutSeconds": 3600,
            "next": { "step": "starting-server-client" },
            "catch": "fail"
        }"#;

        let step: Step = serde_json::from_str(json).unwrap();
        assert_eq!(step.wait_timeout(), Some(Duration::from_secs(3600)));
        assert_eq!(step.next, Some(Target::step("starting-server-client")));
        assert_eq!(step.catch, Some(Target::Fail));
    }
}
