//! Execution state storage trait
//!
//! This module defines the trait for persisting definitions and execution
//! records. Implementations can use different backends; the in-memory
//! store backs tests and single-process deployments.

use crate::error::Result;
use async_trait::async_trait;
use bosun_model::{Execution, ExecutionId, ExecutionStatus, WorkflowDefinition};

/// Trait for definition and execution persistence
///
/// The store holds snapshots; executions are owned and mutated by the
/// orchestrator, which writes back after every transition.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Get a definition by id
    async fn get_definition(&self, id: &str) -> Result<Option<WorkflowDefinition>>;

    /// List all definitions
    async fn list_definitions(&self) -> Result<Vec<WorkflowDefinition>>;

    /// Save a definition
    async fn put_definition(&self, definition: &WorkflowDefinition) -> Result<()>;

    /// Delete a definition
    async fn delete_definition(&self, id: &str) -> Result<()>;

    /// Get an execution by id
    async fn get_execution(&self, id: ExecutionId) -> Result<Option<Execution>>;

    /// List all executions
    async fn list_executions(&self) -> Result<Vec<Execution>>;

    /// List executions with the given status
    async fn list_executions_by_status(&self, status: ExecutionStatus) -> Result<Vec<Execution>>;

    /// Save an execution snapshot
    async fn put_execution(&self, execution: &Execution) -> Result<()>;

    /// Delete an execution
    async fn delete_execution(&self, id: ExecutionId) -> Result<()>;
}

/// In-memory state store
#[derive(Debug, Default)]
pub struct MemoryExecutionStore {
    definitions: std::sync::RwLock<std::collections::HashMap<String, WorkflowDefinition>>,
    executions: std::sync::RwLock<std::collections::HashMap<ExecutionId, Execution>>,
}

impl MemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStore for MemoryExecutionStore {
    async fn get_definition(&self, id: &str) -> Result<Option<WorkflowDefinition>> {
        Ok(self.definitions.read().unwrap().get(id).cloned())
    }

    async fn list_definitions(&self) -> Result<Vec<WorkflowDefinition>> {
        Ok(self.definitions.read().unwrap().values().cloned().collect())
    }

    async fn put_definition(&self, definition: &WorkflowDefinition) -> Result<()> {
        self.definitions
            .write()
            .unwrap()
            .insert(definition.id.clone(), definition.clone());
        Ok(())
    }

    async fn delete_definition(&self, id: &str) -> Result<()> {
        self.definitions.write().unwrap().remove(id);
        Ok(())
    }

    async fn get_execution(&self, id: ExecutionId) -> Result<Option<Execution>> {
        Ok(self.executions.read().unwrap().get(&id).cloned())
    }

    async fn list_executions(&self) -> Result<Vec<Execution>> {
        Ok(self.executions.read().unwrap().values().cloned().collect())
    }

    async fn list_executions_by_status(&self, status: ExecutionStatus) -> Result<Vec<Execution>> {
        Ok(self
            .executions
            .read()
            .unwrap()
            .values()
            .filter(|e| e.status == status)
            .cloned()
            .collect())
    }

    async fn put_execution(&self, execution: &Execution) -> Result<()> {
        self.executions
            .write()
            .unwrap()
            .insert(execution.id, execution.clone());
        Ok(())
    }

    async fn delete_execution(&self, id: ExecutionId) -> Result<()> {
        self.executions.write().unwrap().remove(&id);
        Ok(())
    }
}
