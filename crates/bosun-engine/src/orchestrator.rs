//! Workflow orchestration
//!
//! This module provides the Orchestrator that walks a definition's
//! transition graph for each execution:
//! 1. Invoke steps call their executor and forward its output
//! 2. Callback-wait steps initiate an external operation, then suspend
//!    until the matching completion signal, a timeout, or a cancellation
//! 3. Failures route to the step's catch target, or fail the execution
//! 4. Progress is reported via broadcast events and the execution store

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::registry::{CallbackRegistry, Resumption};
use crate::store::ExecutionStore;
use bosun_executors::{ExecutorContext, ExecutorEngine};
use bosun_model::{
    CallbackToken, Execution, ExecutionId, FailureInfo, Payload, Step, Target, WorkflowDefinition,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Event emitted during execution dispatch
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    /// Execution started
    Started {
        execution: ExecutionId,
        definition: String,
    },
    /// Step dispatch started
    StepStarted { execution: ExecutionId, step: String },
    /// Step dispatch finished
    StepCompleted {
        execution: ExecutionId,
        step: String,
        success: bool,
    },
    /// Execution suspended on a callback wait
    Suspended {
        execution: ExecutionId,
        step: String,
        token: CallbackToken,
    },
    /// Execution resumed by a completion signal
    Resumed { execution: ExecutionId, step: String },
    /// Execution reached a terminal state
    Completed {
        execution: ExecutionId,
        success: bool,
    },
}

/// The workflow orchestration engine
///
/// Walks the transition graph for each execution, dispatching steps,
/// registering and consuming callback tokens, applying timeout and catch
/// routing, and reporting final status. Executions run as independent
/// tasks; a suspended execution is a parked future, not a blocked worker.
pub struct Orchestrator {
    /// Executor registry for invoke and initiate calls
    executors: ExecutorEngine,

    /// Definition and execution persistence
    store: Arc<dyn ExecutionStore>,

    /// Outstanding callback waits
    registry: CallbackRegistry,

    /// Event sender for execution events
    events: broadcast::Sender<ExecutionEvent>,

    /// Engine configuration
    config: EngineConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with default configuration
    pub fn new(executors: ExecutorEngine, store: Arc<dyn ExecutionStore>) -> Self {
        Self::with_config(executors, store, EngineConfig::default())
    }

    /// Create a new orchestrator with the given configuration
    pub fn with_config(
        executors: ExecutorEngine,
        store: Arc<dyn ExecutionStore>,
        config: EngineConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            executors,
            store,
            registry: CallbackRegistry::new(),
            events,
            config,
        }
    }

    /// Subscribe to execution events
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.events.subscribe()
    }

    /// The callback registry (exposed for observability)
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Validate and register a definition
    pub async fn register_definition(&self, definition: WorkflowDefinition) -> Result<()> {
        definition.validate()?;
        self.store.put_definition(&definition).await
    }

    /// Start a new execution of a registered definition
    ///
    /// Returns the execution id immediately; dispatch runs as its own task.
    pub async fn start(
        self: &Arc<Self>,
        definition_id: &str,
        payload: Payload,
    ) -> Result<ExecutionId> {
        let definition = self
            .store
            .get_definition(definition_id)
            .await?
            .ok_or_else(|| EngineError::DefinitionNotFound(definition_id.to_string()))?;

        let execution = Execution::new(&definition.id, payload, &definition.start);
        let id = execution.id;
        self.store.put_execution(&execution).await?;

        info!(execution = %id, definition = %definition.id, "starting execution");
        self.emit(ExecutionEvent::Started {
            execution: id,
            definition: definition.id.clone(),
        });

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = orchestrator.drive(id, &definition).await {
                error!(execution = %id, error = %err, "execution dispatch aborted");
            }
        });

        Ok(id)
    }

    /// Start an execution and wait for its terminal state
    pub async fn run_to_completion(
        self: &Arc<Self>,
        definition_id: &str,
        payload: Payload,
    ) -> Result<Execution> {
        let id = self.start(definition_id, payload).await?;
        self.wait(id).await
    }

    /// Deliver a completion signal
    ///
    /// Returns true when a suspended execution was resumed. An unknown or
    /// already-consumed token is an idempotent no-op returning false, never
    /// an error, so redelivered signals are harmless.
    pub fn resume(&self, token: CallbackToken, payload: Payload) -> bool {
        self.registry.complete(&token, payload)
    }

    /// Cancel a suspended execution
    ///
    /// Consumes the execution's callback token and fails the execution
    /// without taking its catch path; a user-directed abort is not a step
    /// failure to compensate for.
    pub async fn cancel(&self, id: ExecutionId) -> Result<()> {
        if self.registry.cancel_execution(id) {
            return Ok(());
        }

        match self.store.get_execution(id).await? {
            None => Err(EngineError::ExecutionNotFound(id)),
            Some(execution) if execution.is_terminal() => Err(EngineError::AlreadyCompleted(id)),
            Some(_) => Err(EngineError::NotSuspended(id)),
        }
    }

    /// Get the current status and payload of an execution
    pub async fn status(&self, id: ExecutionId) -> Result<Execution> {
        self.store
            .get_execution(id)
            .await?
            .ok_or(EngineError::ExecutionNotFound(id))
    }

    /// Wait for an execution to reach a terminal state
    pub async fn wait(&self, id: ExecutionId) -> Result<Execution> {
        let mut events = self.subscribe();

        loop {
            let execution = self.status(id).await?;
            if execution.is_terminal() {
                return Ok(execution);
            }

            match events.recv().await {
                Ok(ExecutionEvent::Completed { execution, .. }) if execution == id => {
                    return self.status(id).await;
                }
                Ok(_) => continue,
                // Lagged receivers re-check the store; Closed cannot occur
                // while self holds the sender.
                Err(_) => continue,
            }
        }
    }

    fn emit(&self, event: ExecutionEvent) {
        let _ = self.events.send(event);
    }

    fn context_for(&self, execution: &Execution, step: &Step) -> ExecutorContext {
        let mut ctx = ExecutorContext::new(
            execution.id,
            &execution.definition,
            &step.id,
            execution.payload.clone(),
        );
        if let Some(timeout) = self.config.default_invoke_timeout {
            ctx = ctx.with_timeout(timeout);
        }
        ctx
    }

    /// Drive one execution from its start step to a terminal state
    async fn drive(&self, id: ExecutionId, definition: &WorkflowDefinition) -> Result<()> {
        let mut execution = self
            .store
            .get_execution(id)
            .await?
            .ok_or(EngineError::ExecutionNotFound(id))?;

        let mut current = Target::step(&definition.start);

        loop {
            let step_id = match &current {
                Target::Succeed => return self.finish(&mut execution, true).await,
                Target::Fail => return self.finish(&mut execution, false).await,
                Target::Step(step_id) => step_id.clone(),
            };

            let step = definition
                .step(&step_id)
                .ok_or_else(|| EngineError::UnknownStep {
                    definition: definition.id.clone(),
                    step: step_id.clone(),
                })?;

            execution.current_step = Some(step_id.clone());
            self.store.put_execution(&execution).await?;
            self.emit(ExecutionEvent::StepStarted {
                execution: id,
                step: step_id,
            });

            current = match step.wait_timeout() {
                None => self.dispatch_invoke(&mut execution, step).await?,
                Some(timeout) => self.dispatch_wait(&mut execution, step, timeout).await?,
            };
        }
    }

    /// Dispatch a synchronous invoke step
    async fn dispatch_invoke(&self, execution: &mut Execution, step: &Step) -> Result<Target> {
        let ctx = self.context_for(execution, step);

        match self.executors.execute(&step.executor, &ctx).await {
            Ok(output) => {
                execution.payload = output;
                self.emit(ExecutionEvent::StepCompleted {
                    execution: execution.id,
                    step: step.id.clone(),
                    success: true,
                });
                Ok(step.next.clone().unwrap_or(Target::Succeed))
            }
            Err(err) => {
                execution.record_failure(FailureInfo::executor(err.to_string()));
                self.emit(ExecutionEvent::StepCompleted {
                    execution: execution.id,
                    step: step.id.clone(),
                    success: false,
                });
                Ok(self.route_failure(execution, step))
            }
        }
    }

    /// Dispatch a callback-wait step: initiate, suspend, and arbitrate
    /// between completion signal, timeout, and cancellation
    async fn dispatch_wait(
        &self,
        execution: &mut Execution,
        step: &Step,
        wait_timeout: Duration,
    ) -> Result<Target> {
        let token = CallbackToken::new();

        // Register before the initiate call hands the token to the outside
        // world, so a completion signal can never beat its registration.
        let mut receiver = self
            .registry
            .register(token, execution.id, &step.id, wait_timeout);

        let ctx = self.context_for(execution, step).with_callback_token(token);
        if let Err(err) = self.executors.execute(&step.executor, &ctx).await {
            self.registry.expire(&token);
            execution.record_failure(FailureInfo::executor(err.to_string()));
            self.emit(ExecutionEvent::StepCompleted {
                execution: execution.id,
                step: step.id.clone(),
                success: false,
            });
            return Ok(self.route_failure(execution, step));
        }

        // Initiation succeeded; its output is discarded. Only the
        // completion signal's payload feeds back into the execution.
        execution.suspend();
        self.store.put_execution(execution).await?;
        self.emit(ExecutionEvent::Suspended {
            execution: execution.id,
            step: step.id.clone(),
            token,
        });
        info!(
            execution = %execution.id,
            step = %step.id,
            %token,
            timeout = ?wait_timeout,
            "execution suspended awaiting callback"
        );

        let resumption = match tokio::time::timeout(wait_timeout, &mut receiver).await {
            Ok(Ok(resumption)) => Some(resumption),
            Ok(Err(_)) => return Err(EngineError::ResumptionChannelClosed(execution.id)),
            Err(_elapsed) => {
                if self.registry.expire(&token) {
                    // The timeout won: the token was still live.
                    None
                } else {
                    // A completion signal or cancellation consumed the
                    // token first; its resumption is already in flight.
                    let resumption = receiver
                        .await
                        .map_err(|_| EngineError::ResumptionChannelClosed(execution.id))?;
                    Some(resumption)
                }
            }
        };

        match resumption {
            Some(Resumption::Completed(signal)) => {
                execution.payload.merge(signal);
                execution.resume();
                self.store.put_execution(execution).await?;
                self.emit(ExecutionEvent::Resumed {
                    execution: execution.id,
                    step: step.id.clone(),
                });
                self.emit(ExecutionEvent::StepCompleted {
                    execution: execution.id,
                    step: step.id.clone(),
                    success: true,
                });
                Ok(step.next.clone().unwrap_or(Target::Succeed))
            }
            None => {
                warn!(
                    execution = %execution.id,
                    step = %step.id,
                    timeout = ?wait_timeout,
                    "callback wait timed out"
                );
                execution.resume();
                execution.record_failure(FailureInfo::timeout(format!(
                    "no completion signal within {wait_timeout:?}"
                )));
                self.emit(ExecutionEvent::StepCompleted {
                    execution: execution.id,
                    step: step.id.clone(),
                    success: false,
                });
                Ok(self.route_failure(execution, step))
            }
            Some(Resumption::Cancelled) => {
                info!(
                    execution = %execution.id,
                    step = %step.id,
                    "execution cancelled while suspended"
                );
                execution.resume();
                execution.record_failure(FailureInfo::cancelled());
                self.emit(ExecutionEvent::StepCompleted {
                    execution: execution.id,
                    step: step.id.clone(),
                    success: false,
                });
                // A user-directed abort never takes the catch path.
                Ok(Target::Fail)
            }
        }
    }

    fn route_failure(&self, execution: &Execution, step: &Step) -> Target {
        match &step.catch {
            Some(target) => {
                debug!(
                    execution = %execution.id,
                    step = %step.id,
                    "routing failure to catch target"
                );
                target.clone()
            }
            None => Target::Fail,
        }
    }

    /// Record a terminal state and notify subscribers
    async fn finish(&self, execution: &mut Execution, success: bool) -> Result<()> {
        execution.current_step = None;
        if success {
            execution.succeed();
        } else {
            execution.fail();
        }
        self.store.put_execution(execution).await?;

        info!(
            execution = %execution.id,
            definition = %execution.definition,
            success,
            "execution completed"
        );
        self.emit(ExecutionEvent::Completed {
            execution: execution.id,
            success,
        });
        Ok(())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("executors", &self.executors)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
