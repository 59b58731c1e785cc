//! End-to-end provisioning scenarios
//!
//! These tests drive full executions through the orchestrator: the
//! rollback-on-timeout shape, the chained-wait shape, signal idempotency,
//! and cancellation. Timeout scenarios run under a paused clock so the
//! one-hour bootstrap wait is simulated, not slept.

use bosun_engine::{EngineConfig, ExecutionEvent, MemoryExecutionStore, Orchestrator};
use bosun_executors::{ExecutorEngine, NoopExecutor, RecordingExecutor, StaticExecutor};
use bosun_model::{
    DefinitionBuilder, ExecutionStatus, FailureKind, Payload, StageChain, Step, Target,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Provision -> CallbackWait(bootstrap, 1h) -> Succeed, with catch from the
/// wait to Invoke(rollback) -> Fail.
fn rollback_definition() -> bosun_model::WorkflowDefinition {
    DefinitionBuilder::new("provision-server")
        .add_step(Step::invoke("provision", "provision"))
        .add_step(Step::callback_wait(
            "bootstrap",
            "enqueue-token",
            Duration::from_secs(3600),
        ))
        .add_step(Step::invoke("rollback", "rollback"))
        .start_at("provision")
        .connect("provision", Target::step("bootstrap"))
        .connect("bootstrap", Target::Succeed)
        .catch("bootstrap", Target::step("rollback"))
        .connect("rollback", Target::Fail)
        .build()
        .unwrap()
}

async fn next_suspension(events: &mut broadcast::Receiver<ExecutionEvent>) -> bosun_model::CallbackToken {
    loop {
        if let ExecutionEvent::Suspended { token, .. } = events.recv().await.unwrap() {
            return token;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn bootstrap_timeout_runs_rollback_before_failing() {
    let rollback = Arc::new(
        RecordingExecutor::new("rollback")
            .with_output(Payload::new().with("serverId", "s1").with("rolledBack", true)),
    );

    let mut executors = ExecutorEngine::new();
    executors.register(NoopExecutor::new("provision"));
    executors.register(NoopExecutor::new("enqueue-token"));
    executors.register_arc(rollback.clone());

    let orchestrator = Arc::new(Orchestrator::new(
        executors,
        Arc::new(MemoryExecutionStore::new()),
    ));
    orchestrator
        .register_definition(rollback_definition())
        .await
        .unwrap();

    let mut events = orchestrator.subscribe();
    let id = orchestrator
        .start("provision-server", Payload::new().with("serverId", "s1"))
        .await
        .unwrap();

    // No signal is ever delivered; the paused clock advances through the
    // one-hour window on its own.
    let finished = orchestrator.wait(id).await.unwrap();

    assert_eq!(finished.status, ExecutionStatus::Failed);
    let failure = finished.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Timeout);

    // The terminal payload is the rollback executor's output.
    assert_eq!(
        finished.payload.get("rolledBack"),
        Some(&serde_json::json!(true))
    );

    // The rollback saw the payload as it stood when the wait gave up.
    assert_eq!(rollback.call_count(), 1);
    assert_eq!(rollback.calls()[0].payload.get_str("serverId"), Some("s1"));

    // Suspended -> Running(rollback) -> Failed, never Suspended -> Failed.
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    let suspended_at = seen
        .iter()
        .position(|e| matches!(e, ExecutionEvent::Suspended { .. }))
        .unwrap();
    let rollback_at = seen
        .iter()
        .position(|e| matches!(e, ExecutionEvent::StepStarted { step, .. } if step == "rollback"))
        .unwrap();
    let completed_at = seen
        .iter()
        .position(|e| matches!(e, ExecutionEvent::Completed { success: false, .. }))
        .unwrap();
    assert!(suspended_at < rollback_at && rollback_at < completed_at);
}

#[tokio::test(start_paused = true)]
async fn wait_without_catch_fails_on_timeout() {
    let mut executors = ExecutorEngine::new();
    executors.register(NoopExecutor::new("provision"));
    executors.register(NoopExecutor::new("enqueue-token"));

    let definition = DefinitionBuilder::new("d")
        .add_step(Step::invoke("provision", "provision"))
        .add_step(Step::callback_wait(
            "bootstrap",
            "enqueue-token",
            Duration::from_secs(600),
        ))
        .start_at("provision")
        .connect("provision", Target::step("bootstrap"))
        .connect("bootstrap", Target::Succeed)
        .build()
        .unwrap();

    let orchestrator = Arc::new(Orchestrator::new(
        executors,
        Arc::new(MemoryExecutionStore::new()),
    ));
    orchestrator.register_definition(definition).await.unwrap();

    let finished = orchestrator
        .run_to_completion("d", Payload::new())
        .await
        .unwrap();

    assert_eq!(finished.status, ExecutionStatus::Failed);
    assert_eq!(finished.failure.unwrap().kind, FailureKind::Timeout);
    assert_eq!(orchestrator.registry().outstanding(), 0);
}

#[tokio::test(start_paused = true)]
async fn signal_after_timeout_is_ignored() {
    let mut executors = ExecutorEngine::new();
    executors.register(NoopExecutor::new("provision"));
    executors.register(NoopExecutor::new("enqueue-token"));
    executors.register(StaticExecutor::new(
        "rollback",
        Payload::new().with("rolledBack", true),
    ));

    let orchestrator = Arc::new(Orchestrator::new(
        executors,
        Arc::new(MemoryExecutionStore::new()),
    ));
    orchestrator
        .register_definition(rollback_definition())
        .await
        .unwrap();

    let mut events = orchestrator.subscribe();
    let id = orchestrator
        .start("provision-server", Payload::new())
        .await
        .unwrap();
    let token = next_suspension(&mut events).await;

    let finished = orchestrator.wait(id).await.unwrap();
    assert_eq!(finished.status, ExecutionStatus::Failed);

    // The timeout consumed the token; a late signal is a silent no-op.
    assert!(!orchestrator.resume(token, Payload::new().with("late", true)));

    let unchanged = orchestrator.status(id).await.unwrap();
    assert_eq!(unchanged.status, ExecutionStatus::Failed);
    assert!(!unchanged.payload.contains_key("late"));
}

#[tokio::test]
async fn chained_stages_resume_in_order() {
    let enqueue = Arc::new(RecordingExecutor::new("enqueue-token"));

    let mut executors = ExecutorEngine::new();
    executors.register(StaticExecutor::new(
        "provision",
        Payload::new().with("serverId", "s1").with("instanceId", "i-1234"),
    ));
    executors.register(NoopExecutor::new("finish-provision"));
    executors.register_arc(enqueue.clone());

    let chain = StageChain::new(
        ["wait-for-download", "starting-server-client"],
        "enqueue-token",
        Duration::from_secs(3600),
    )
    .unwrap();

    let definition = DefinitionBuilder::new("provision-server-chained")
        .add_step(Step::invoke("provision", "provision"))
        .add_step(Step::invoke("finish", "finish-provision"))
        .start_at("provision")
        .connect("provision", Target::step("wait-for-download"))
        .add_stage_chain(chain, Target::step("finish"))
        .connect("finish", Target::Succeed)
        .build()
        .unwrap();

    let orchestrator = Arc::new(Orchestrator::new(
        executors,
        Arc::new(MemoryExecutionStore::new()),
    ));
    orchestrator.register_definition(definition).await.unwrap();

    let mut events = orchestrator.subscribe();
    let id = orchestrator
        .start("provision-server-chained", Payload::new())
        .await
        .unwrap();

    // First stage suspends; resume it with the download result.
    let first = next_suspension(&mut events).await;
    assert!(orchestrator.resume(first, Payload::new().with("downloadReady", true)));

    // Second stage mints a fresh token.
    let second = next_suspension(&mut events).await;
    assert_ne!(first, second);
    assert!(orchestrator.resume(second, Payload::new().with("clientStarted", true)));

    let finished = orchestrator.wait(id).await.unwrap();
    assert_eq!(finished.status, ExecutionStatus::Succeeded);

    // Both stage results accumulated over the provision output.
    assert_eq!(finished.payload.get_str("instanceId"), Some("i-1234"));
    assert_eq!(
        finished.payload.get("downloadReady"),
        Some(&serde_json::json!(true))
    );
    assert_eq!(
        finished.payload.get("clientStarted"),
        Some(&serde_json::json!(true))
    );

    // The stages initiated in input order, each with its own token.
    let calls = enqueue.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].step, "wait-for-download");
    assert_eq!(calls[1].step, "starting-server-client");
    assert_ne!(calls[0].callback_token, calls[1].callback_token);
}

#[tokio::test]
async fn duplicate_signal_is_idempotent() {
    let mut executors = ExecutorEngine::new();
    executors.register(NoopExecutor::new("provision"));
    executors.register(NoopExecutor::new("enqueue-token"));
    executors.register(NoopExecutor::new("rollback"));

    let orchestrator = Arc::new(Orchestrator::with_config(
        executors,
        Arc::new(MemoryExecutionStore::new()),
        EngineConfig::new().with_event_capacity(64),
    ));
    orchestrator
        .register_definition(rollback_definition())
        .await
        .unwrap();

    let mut events = orchestrator.subscribe();
    let id = orchestrator
        .start("provision-server", Payload::new().with("serverId", "s1"))
        .await
        .unwrap();
    let token = next_suspension(&mut events).await;

    assert!(orchestrator.resume(token, Payload::new().with("bootstrapped", true)));
    // Redelivery of the same signal: consumed token, silent no-op.
    assert!(!orchestrator.resume(token, Payload::new().with("bootstrapped", false)));

    let finished = orchestrator.wait(id).await.unwrap();
    assert_eq!(finished.status, ExecutionStatus::Succeeded);
    assert_eq!(
        finished.payload.get("bootstrapped"),
        Some(&serde_json::json!(true))
    );
}

#[tokio::test]
async fn concurrent_executions_are_independent() {
    let mut executors = ExecutorEngine::new();
    executors.register(NoopExecutor::new("provision"));
    executors.register(NoopExecutor::new("enqueue-token"));
    executors.register(NoopExecutor::new("rollback"));

    let orchestrator = Arc::new(Orchestrator::new(
        executors,
        Arc::new(MemoryExecutionStore::new()),
    ));
    orchestrator
        .register_definition(rollback_definition())
        .await
        .unwrap();

    let mut events = orchestrator.subscribe();

    let first = orchestrator
        .start("provision-server", Payload::new().with("serverId", "s1"))
        .await
        .unwrap();
    let first_token = next_suspension(&mut events).await;

    let second = orchestrator
        .start("provision-server", Payload::new().with("serverId", "s2"))
        .await
        .unwrap();
    let second_token = next_suspension(&mut events).await;

    assert_eq!(orchestrator.registry().outstanding(), 2);

    // Cancelling the second execution leaves the first suspended.
    orchestrator.cancel(second).await.unwrap();
    let cancelled = orchestrator.wait(second).await.unwrap();
    assert_eq!(cancelled.status, ExecutionStatus::Failed);
    assert_eq!(cancelled.failure.unwrap().kind, FailureKind::Cancelled);

    assert!(orchestrator.status(first).await.unwrap().is_suspended());
    assert_ne!(first_token, second_token);

    // The first execution still resumes normally.
    assert!(orchestrator.resume(first_token, Payload::new().with("bootstrapped", true)));
    let finished = orchestrator.wait(first).await.unwrap();
    assert_eq!(finished.status, ExecutionStatus::Succeeded);
    assert_eq!(finished.payload.get_str("serverId"), Some("s1"));
}
