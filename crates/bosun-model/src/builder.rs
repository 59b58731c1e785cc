//! Definition builder
//!
//! Builds a [`WorkflowDefinition`] from steps and edges, rejecting
//! malformed graphs at build time so construction errors can never
//! surface mid-run.

use crate::chain::StageChain;
use crate::definition::WorkflowDefinition;
use crate::error::{ModelError, Result};
use crate::step::{Step, Target};
use std::collections::HashMap;

/// Builder for workflow definitions
///
/// Steps and edges are collected unchecked; [`DefinitionBuilder::build`]
/// applies the edges and validates the resulting graph (duplicate ids,
/// dangling references, cycles, missing start).
///
/// # Example
///
/// ```
/// use bosun_model::{DefinitionBuilder, Step, Target};
/// use std::time::Duration;
///
/// let definition = DefinitionBuilder::new("provision-server")
///     .add_step(Step::invoke("provision", "provision-server"))
///     .add_step(Step::callback_wait("bootstrap", "enqueue-token", Duration::from_secs(3600)))
///     .add_step(Step::invoke("rollback", "rollback-server"))
///     .start_at("provision")
///     .connect("provision", Target::step("bootstrap"))
///     .connect("bootstrap", Target::Succeed)
///     .catch("bootstrap", Target::step("rollback"))
///     .connect("rollback", Target::Fail)
///     .build()
///     .unwrap();
///
/// assert_eq!(definition.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct DefinitionBuilder {
    id: String,
    steps: Vec<Step>,
    start: Option<String>,
    next_edges: Vec<(String, Target)>,
    catch_edges: Vec<(String, Target)>,
}

impl DefinitionBuilder {
    /// Create a builder for a definition with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Register a step
    pub fn add_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Designate the start step
    pub fn start_at(mut self, id: impl Into<String>) -> Self {
        self.start = Some(id.into());
        self
    }

    /// Set the success transition of `from`
    pub fn connect(mut self, from: impl Into<String>, to: Target) -> Self {
        self.next_edges.push((from.into(), to));
        self
    }

    /// Set the failure transition of `from`
    pub fn catch(mut self, from: impl Into<String>, to: Target) -> Self {
        self.catch_edges.push((from.into(), to));
        self
    }

    /// Append a stage chain, linking its last stage to `follow_on`
    ///
    /// The chain's internal links and trailing link are produced by the
    /// chain itself; the caller still has to connect some earlier step to
    /// the chain's first stage (or start there).
    pub fn add_stage_chain(mut self, chain: StageChain, follow_on: Target) -> Self {
        self.steps.extend(chain.into_steps(follow_on));
        self
    }

    /// Apply edges, validate, and produce the immutable definition
    pub fn build(self) -> Result<WorkflowDefinition> {
        let mut steps: HashMap<String, Step> = HashMap::with_capacity(self.steps.len());
        for step in self.steps {
            if steps.contains_key(&step.id) {
                return Err(ModelError::DuplicateStep(step.id));
            }
            steps.insert(step.id.clone(), step);
        }

        for (from, to) in self.next_edges {
            let step = steps
                .get_mut(&from)
                .ok_or(ModelError::UnknownStep(from))?;
            step.next = Some(to);
        }

        for (from, to) in self.catch_edges {
            let step = steps
                .get_mut(&from)
                .ok_or(ModelError::UnknownStep(from))?;
            step.catch = Some(to);
        }

        let definition = WorkflowDefinition {
            start: self
                .start
                .ok_or_else(|| ModelError::MissingStart(self.id.clone()))?,
            id: self.id,
            steps,
        };

        definition.validate()?;
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn rollback_shape() -> DefinitionBuilder {
        DefinitionBuilder::new("provision-server")
            .add_step(Step::invoke("provision", "provision-server"))
            .add_step(Step::callback_wait(
                "bootstrap",
                "enqueue-token",
                Duration::from_secs(3600),
            ))
            .add_step(Step::invoke("rollback", "rollback-server"))
            .start_at("provision")
            .connect("provision", Target::step("bootstrap"))
            .connect("bootstrap", Target::Succeed)
            .catch("bootstrap", Target::step("rollback"))
            .connect("rollback", Target::Fail)
    }

    #[test]
    fn test_build_rollback_shape() {
        let definition = rollback_shape().build().unwrap();

        assert_eq!(definition.id, "provision-server");
        assert_eq!(definition.start, "provision");
        assert_eq!(definition.len(), 3);

        let bootstrap = definition.step("bootstrap").unwrap();
        assert_eq!(bootstrap.next, Some(Target::Succeed));
        assert_eq!(bootstrap.catch, Some(Target::step("rollback")));

        let rollback = definition.step("rollback").unwrap();
        assert_eq!(rollback.next, Some(Target::Fail));
        assert_eq!(rollback.catch, None);
    }

    #[test]
    fn test_build_rejects_duplicate_step() {
        let result = DefinitionBuilder::new("d")
            .add_step(Step::invoke("a", "x"))
            .add_step(Step::invoke("a", "y"))
            .start_at("a")
            .build();

        assert!(matches!(result, Err(ModelError::DuplicateStep(id)) if id == "a"));
    }

    #[test]
    fn test_build_rejects_edge_from_unknown_step() {
        let result = DefinitionBuilder::new("d")
            .add_step(Step::invoke("a", "x"))
            .start_at("a")
            .connect("ghost", Target::Succeed)
            .build();

        assert!(matches!(result, Err(ModelError::UnknownStep(id)) if id == "ghost"));
    }

    #[test]
    fn test_build_rejects_edge_to_unknown_step() {
        let result = DefinitionBuilder::new("d")
            .add_step(Step::invoke("a", "x"))
            .start_at("a")
            .connect("a", Target::step("ghost"))
            .build();

        assert!(matches!(result, Err(ModelError::UnknownStep(id)) if id == "ghost"));
    }

    #[test]
    fn test_build_rejects_missing_start() {
        let result = DefinitionBuilder::new("d")
            .add_step(Step::invoke("a", "x"))
            .build();

        assert!(matches!(result, Err(ModelError::MissingStart(_))));
    }

    #[test]
    fn test_build_rejects_self_loop() {
        let result = DefinitionBuilder::new("d")
            .add_step(Step::invoke("a", "x"))
            .start_at("a")
            .connect("a", Target::step("a"))
            .build();

        assert!(matches!(result, Err(ModelError::CycleDetected(_))));
    }

    #[test]
    fn test_build_rejects_two_node_cycle() {
        let result = DefinitionBuilder::new("d")
            .add_step(Step::invoke("a", "x"))
            .add_step(Step::invoke("b", "y"))
            .start_at("a")
            .connect("a", Target::step("b"))
            .connect("b", Target::step("a"))
            .build();

        assert!(matches!(result, Err(ModelError::CycleDetected(_))));
    }

    #[test]
    fn test_build_rejects_empty_definition() {
        let result = DefinitionBuilder::new("d").start_at("a").build();
        // No steps registered: the start reference cannot resolve.
        assert!(result.is_err());
    }

    #[test]
    fn test_build_with_stage_chain() {
        let chain = StageChain::new(
            ["wait-for-download", "starting-server-client"],
            "enqueue-token",
            Duration::from_secs(3600),
        )
        .unwrap();

        let definition = DefinitionBuilder::new("provision-server")
            .add_step(Step::invoke("provision", "provision-server"))
            .add_step(Step::invoke("finish", "finish-provision"))
            .start_at("provision")
            .connect("provision", Target::step("wait-for-download"))
            .add_stage_chain(chain, Target::step("finish"))
            .connect("finish", Target::Succeed)
            .build()
            .unwrap();

        assert_eq!(definition.len(), 4);
        let first = definition.step("wait-for-download").unwrap();
        assert_eq!(first.next, Some(Target::step("starting-server-client")));
        let last = definition.step("starting-server-client").unwrap();
        assert_eq!(last.next, Some(Target::step("finish")));
    }
}
