// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::ActivityFn;
use serde_json::json;
use wl_client::MockService;
use wl_core::failure::decode_failure;
use wl_proto::RecordActivityTaskHeartbeatResponse;

fn poller(
    service: Arc<MockService>,
    activities: ActivityRegistry,
) -> Arc<ActivityTaskPoller<MockService>> {
    let config = Arc::new(
        crate::config::WorkerConfig::builder("default", "orders")
            .identity("act-worker")
            .build(),
    );
    Arc::new(ActivityTaskPoller {
        service,
        config,
        activities,
        slots: Arc::new(Semaphore::new(10)),
        call_policy: CallPolicy::default(),
        shutdown: CancellationToken::new(),
    })
}

fn registry_with(name: &str, f: ActivityFn) -> ActivityRegistry {
    let mut registry = ActivityRegistry::new();
    registry.register(name, f);
    registry
}

#[tokio::test]
async fn success_reports_completion() {
    let service = Arc::new(MockService::new());
    let registry = registry_with(
        "Charge",
        Arc::new(|ctx: ActivityContext, input: Payloads| {
            Box::pin(async move {
                assert_eq!(ctx.attempt, 1);
                let amount: i64 = input.decode_at(0).unwrap_or(0);
                Ok(ActivityResult::Completed(
                    Payloads::single(&json!(amount * 2)).unwrap_or_default(),
                ))
            })
        }),
    );
    let poller = poller(service.clone(), registry);

    let task = ActivityTask::builder()
        .activity_type("Charge")
        .input(Payloads::single(&json!(21)).unwrap())
        .build();
    poller.process(task).await;

    let completions = service.activity_completions();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].result.decode_at::<i64>(0).unwrap(), 42);
    assert_eq!(completions[0].identity, "act-worker");
}

#[tokio::test]
async fn domain_error_reports_failure() {
    let service = Arc::new(MockService::new());
    let registry = registry_with(
        "Charge",
        Arc::new(|_ctx, _input| {
            Box::pin(async {
                Err(WorkflowError::Application {
                    message: "card declined".into(),
                    error_type: "DeclinedError".into(),
                    non_retryable: false,
                    details: Payloads::new(),
                    cause: None,
                })
            })
        }),
    );
    let poller = poller(service.clone(), registry);
    poller.process(ActivityTask::builder().activity_type("Charge").build()).await;

    let failures = service.activity_failures();
    assert_eq!(failures.len(), 1);
    match decode_failure(&failures[0].failure) {
        WorkflowError::Application { message, error_type, .. } => {
            assert_eq!(message, "card declined");
            assert_eq!(error_type, "DeclinedError");
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn canceled_error_reports_cancellation() {
    let service = Arc::new(MockService::new());
    let registry = registry_with(
        "Cancelable",
        Arc::new(|_ctx, _input| {
            Box::pin(async {
                Err(WorkflowError::Canceled {
                    details: Payloads::single(&json!("cleanup state")).unwrap_or_default(),
                })
            })
        }),
    );
    let poller = poller(service.clone(), registry);
    poller.process(ActivityTask::builder().activity_type("Cancelable").build()).await;

    let canceled = service.activity_cancellations();
    assert_eq!(canceled.len(), 1);
    assert_eq!(canceled[0].details.decode_at::<String>(0).unwrap(), "cleanup state");
}

#[tokio::test]
async fn deadline_breach_reports_start_to_close_timeout() {
    let service = Arc::new(MockService::new());
    let registry = registry_with(
        "Slow",
        Arc::new(|ctx: ActivityContext, _input| {
            Box::pin(async move {
                // The context observes cancellation at the deadline.
                ctx.cancelled().await;
                Err(WorkflowError::canceled())
            })
        }),
    );
    let poller = poller(service.clone(), registry);

    let mut task = ActivityTask::builder().activity_type("Slow").build();
    task.start_to_close_ms = 30;
    poller.process(task).await;

    let failures = service.activity_failures();
    assert_eq!(failures.len(), 1);
    match decode_failure(&failures[0].failure) {
        WorkflowError::Timeout { kind, .. } => assert_eq!(kind, TimeoutKind::StartToClose),
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn panic_reports_retryable_panic_application_failure() {
    let service = Arc::new(MockService::new());
    let registry = registry_with(
        "Boom",
        Arc::new(|_ctx, _input| {
            Box::pin(async {
                panic!("activity blew up");
            })
        }),
    );
    let poller = poller(service.clone(), registry);
    poller.process(ActivityTask::builder().activity_type("Boom").build()).await;

    let failures = service.activity_failures();
    assert_eq!(failures.len(), 1);
    let failure = &failures[0].failure;
    assert!(failure.message.contains("activity blew up"));
    assert!(!failure.stack_trace.is_empty());
    assert_eq!(
        failure.info,
        FailureInfo::Application {
            error_type: PANIC_ERROR_TYPE.to_string(),
            non_retryable: false,
            details: Payloads::new(),
        }
    );
}

#[tokio::test]
async fn unregistered_activity_fails_non_retryably() {
    let service = Arc::new(MockService::new());
    let poller = poller(service.clone(), ActivityRegistry::new());
    poller.process(ActivityTask::builder().activity_type("Ghost").build()).await;

    let failures = service.activity_failures();
    assert_eq!(failures.len(), 1);
    assert!(!wl_core::error::is_retryable(&decode_failure(&failures[0].failure), &[]));
}

#[tokio::test]
async fn pending_result_sends_no_response() {
    let service = Arc::new(MockService::new());
    let registry = registry_with(
        "Async",
        Arc::new(|_ctx, _input| Box::pin(async { Ok(ActivityResult::Pending) })),
    );
    let poller = poller(service.clone(), registry);
    poller.process(ActivityTask::builder().activity_type("Async").build()).await;

    assert!(service.activity_completions().is_empty());
    assert!(service.activity_failures().is_empty());
    assert!(service.activity_cancellations().is_empty());
}

#[tokio::test]
async fn heartbeat_cancel_request_cancels_the_context() {
    let service = Arc::new(MockService::new());
    service.on_heartbeat(|_req| RecordActivityTaskHeartbeatResponse { cancel_requested: true });

    let registry = registry_with(
        "HeartbeatLoop",
        Arc::new(|ctx: ActivityContext, _input| {
            Box::pin(async move {
                ctx.heartbeat(Payloads::single(&json!("progress")).unwrap_or_default());
                ctx.cancelled().await;
                Err(WorkflowError::canceled())
            })
        }),
    );
    let poller = poller(service.clone(), registry);

    let mut task = ActivityTask::builder().activity_type("HeartbeatLoop").build();
    task.heartbeat_timeout_ms = Some(50);
    task.start_to_close_ms = 5_000;
    poller.process(task).await;

    assert_eq!(service.heartbeat_requests().len(), 1);
    assert_eq!(service.activity_cancellations().len(), 1);
}
