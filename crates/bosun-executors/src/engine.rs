//! Executor registry and invocation
//!
//! This module provides the ExecutorEngine which is responsible for
//! registering, looking up, and invoking executors with proper timeout
//! handling and input validation.

use crate::context::ExecutorContext;
use crate::error::{ExecutorError, Result};
use crate::traits::Executor;
use bosun_model::Payload;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// The executor registry and invocation engine
///
/// # Example
///
/// ```ignore
/// use bosun_executors::{ExecutorEngine, NoopExecutor};
///
/// let mut engine = ExecutorEngine::new();
/// engine.register(NoopExecutor::new("provision-server"));
///
/// let output = engine.execute("provision-server", &ctx).await?;
/// ```
pub struct ExecutorEngine {
    /// Registered executors by name
    executors: HashMap<String, Arc<dyn Executor>>,

    /// Default timeout applied when neither the context nor the executor
    /// supplies one
    default_timeout: Option<Duration>,
}

impl Default for ExecutorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorEngine {
    /// Create a new, empty engine
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
            default_timeout: None,
        }
    }

    /// Set the default timeout for all executor calls
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Register an executor
    pub fn register<E: Executor + 'static>(&mut self, executor: E) {
        let name = executor.name().to_string();
        self.executors.insert(name, Arc::new(executor));
    }

    /// Register an executor (Arc version for shared ownership)
    pub fn register_arc(&mut self, executor: Arc<dyn Executor>) {
        let name = executor.name().to_string();
        self.executors.insert(name, executor);
    }

    /// Get an executor by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Executor>> {
        self.executors.get(name)
    }

    /// Check if an executor is registered
    pub fn has_executor(&self, name: &str) -> bool {
        self.executors.contains_key(name)
    }

    /// Get all registered executor names
    pub fn executor_names(&self) -> Vec<&str> {
        self.executors.keys().map(|s| s.as_str()).collect()
    }

    /// Get the number of registered executors
    pub fn executor_count(&self) -> usize {
        self.executors.len()
    }

    /// Invoke an executor by name
    ///
    /// Looks up the executor, validates the input, and runs the call with
    /// the first timeout found in the cascade: context timeout, executor
    /// default, engine default.
    pub async fn execute(&self, name: &str, ctx: &ExecutorContext) -> Result<Payload> {
        let executor = self
            .executors
            .get(name)
            .ok_or_else(|| ExecutorError::NotFound(name.to_string()))?;

        executor.validate(ctx)?;

        let call_timeout = ctx
            .timeout()
            .or_else(|| executor.default_timeout())
            .or(self.default_timeout);

        debug!(
            executor = name,
            execution = %ctx.execution(),
            step = ctx.step(),
            "invoking executor"
        );

        let result = if let Some(timeout_duration) = call_timeout {
            match timeout(timeout_duration, executor.execute(ctx)).await {
                Ok(result) => result,
                Err(_) => Err(ExecutorError::Timeout(timeout_duration)),
            }
        } else {
            executor.execute(ctx).await
        };

        if let Err(ref error) = result {
            warn!(
                executor = name,
                execution = %ctx.execution(),
                step = ctx.step(),
                error = %error,
                "executor call failed"
            );
        }

        result
    }
}

impl std::fmt::Debug for ExecutorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorEngine")
            .field("executors", &self.executors.keys().collect::<Vec<_>>())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}
