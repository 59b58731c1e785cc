//! Workflow definitions
//!
//! A definition is the validated, immutable transition graph one or more
//! executions run against. Construction goes through
//! [`DefinitionBuilder`](crate::DefinitionBuilder); deserialized definitions
//! must pass [`WorkflowDefinition::validate`] before use.

use crate::error::{ModelError, Result};
use crate::step::{Step, Target};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A validated workflow definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Definition id
    pub id: String,

    /// Designated start step
    pub start: String,

    /// Steps by id
    pub steps: HashMap<String, Step>,
}

impl WorkflowDefinition {
    /// Look up a step by id
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.get(id)
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check whether the definition has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Validate the transition graph
    ///
    /// Rejects empty definitions, a missing or unknown start step, edges
    /// referencing unknown step ids, and any cycle (the graph must be a DAG
    /// terminating at the success or fail node). Self-loops count as cycles.
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(ModelError::EmptyDefinition(self.id.clone()));
        }

        if self.start.is_empty() {
            return Err(ModelError::MissingStart(self.id.clone()));
        }

        if !self.steps.contains_key(&self.start) {
            return Err(ModelError::UnknownStep(self.start.clone()));
        }

        // Every edge target must be a registered step or a terminal.
        for step in self.steps.values() {
            for target in [&step.next, &step.catch].into_iter().flatten() {
                if let Some(id) = target.step_id() {
                    if !self.steps.contains_key(id) {
                        return Err(ModelError::UnknownStep(id.to_string()));
                    }
                }
            }
        }

        // Cycle detection over the step graph; terminals cannot take part
        // in a cycle so they are not materialized as nodes.
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for id in self.steps.keys() {
            let idx = graph.add_node(id.as_str());
            indices.insert(id.as_str(), idx);
        }

        for step in self.steps.values() {
            for target in [&step.next, &step.catch].into_iter().flatten() {
                if let Target::Step(to) = target {
                    graph.add_edge(indices[step.id.as_str()], indices[to.as_str()], ());
                }
            }
        }

        if petgraph::algo::is_cyclic_directed(&graph) {
            return Err(ModelError::CycleDetected(self.id.clone()));
        }

        Ok(())
    }
}
