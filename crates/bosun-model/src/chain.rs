//! Stage chain construction
//!
//! Builds a linear run of callback-wait steps from an ordered list of stage
//! names, each stage feeding the next and the last feeding a caller-supplied
//! follow-on target. Every generated stage shares one executor and timeout.

use crate::error::{ModelError, Result};
use crate::step::{Step, Target};
use std::time::Duration;

/// An ordered, non-empty run of callback-wait stages
///
/// For `n` names this produces exactly `n` steps with `n - 1` internal
/// links plus one trailing link to the follow-on target; no stage is
/// skipped, duplicated, or self-linked, including chains of length 1.
#[derive(Debug, Clone, PartialEq)]
pub struct StageChain {
    names: Vec<String>,
    executor: String,
    timeout: Duration,
}

impl StageChain {
    /// Create a stage chain
    ///
    /// Rejects an empty name list; a chain must contain at least one stage.
    pub fn new(
        names: impl IntoIterator<Item = impl Into<String>>,
        executor: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ModelError::EmptyStageChain);
        }
        Ok(Self {
            names,
            executor: executor.into(),
            timeout,
        })
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// A chain is never empty; present for completeness
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Id of the first stage's step, the chain's entry point
    pub fn first_step_id(&self) -> &str {
        &self.names[0]
    }

    /// Produce the chain's steps, linked in input order
    ///
    /// Stage `i` links to stage `i + 1`; the final stage links to
    /// `follow_on`.
    pub fn into_steps(self, follow_on: Target) -> Vec<Step> {
        let count = self.names.len();
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let next = if i + 1 < count {
                    Target::step(&self.names[i + 1])
                } else {
                    follow_on.clone()
                };
                Step::callback_wait(name, &self.executor, self.timeout).with_next(next)
            })
            .collect()
    }
}
