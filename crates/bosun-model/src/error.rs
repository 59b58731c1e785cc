//! Error types for definition construction
//!
//! Every variant here is a build-time rejection: a malformed transition
//! graph is refused before any execution can reference it, never mid-run.

use thiserror::Error;

/// Error type for workflow model construction and validation
#[derive(Debug, Error)]
pub enum ModelError {
    /// A step id was registered twice within one definition
    #[error("duplicate step id: {0}")]
    DuplicateStep(String),

    /// An edge or start reference points at a step that does not exist
    #[error("unknown step id: {0}")]
    UnknownStep(String),

    /// The transition graph contains a cycle
    #[error("cycle detected in transition graph of definition '{0}'")]
    CycleDetected(String),

    /// The definition contains no steps
    #[error("definition '{0}' has no steps")]
    EmptyDefinition(String),

    /// No start step was designated
    #[error("definition '{0}' has no start step")]
    MissingStart(String),

    /// A stage chain was constructed from an empty name list
    #[error("stage chain must contain at least one stage")]
    EmptyStageChain,
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::DuplicateStep("provision".to_string());
        assert_eq!(err.to_string(), "duplicate step id: provision");

        let err = ModelError::CycleDetected("provision-server".to_string());
        assert_eq!(
            err.to_string(),
            "cycle detected in transition graph of definition 'provision-server'"
        );

        let err = ModelError::EmptyStageChain;
        assert_eq!(err.to_string(), "stage chain must contain at least one stage");
    }
}
