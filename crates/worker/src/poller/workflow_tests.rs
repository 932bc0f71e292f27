// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::local::spawn_local_activity_pool;
use crate::registry::{ActivityRegistry, ActivityResult};
use serde_json::json;
use std::sync::Arc;
use wl_client::MockService;
use wl_core::clock::FakeClock;
use wl_core::execution::{TimerId, WorkflowExecution};
use wl_core::payload::Payloads;
use wl_engine::WorkflowFn;
use wl_proto::{EventAttrs, WorkflowQuery, WorkflowTask};
use yare::parameterized;

#[parameterized(
    sticky_disabled = { false, 5, 0, 0, QueueKind::Regular },
    backlog_forces_sticky = { true, 3, 9, 0, QueueKind::Sticky },
    fewer_sticky_pending = { true, 0, 1, 2, QueueKind::Sticky },
    fewer_regular_pending = { true, 0, 3, 1, QueueKind::Regular },
    tie_goes_sticky = { true, 0, 2, 2, QueueKind::Sticky },
    idle_goes_sticky = { true, 0, 0, 0, QueueKind::Sticky },
    backlog_ignored_when_disabled = { false, 100, 0, 5, QueueKind::Regular },
)]
fn queue_selection(
    sticky_enabled: bool,
    backlog: i64,
    pending_sticky: u32,
    pending_regular: u32,
    expected: QueueKind,
) {
    assert_eq!(
        choose_queue(sticky_enabled, backlog, pending_sticky, pending_regular),
        expected
    );
}

fn timer_workflow() -> WorkflowFn {
    Arc::new(|api, _input| {
        Box::pin(async move {
            api.timer(Duration::from_secs(30)).await?;
            Ok(Payloads::new())
        })
    })
}

struct Fixture {
    service: Arc<MockService>,
    poller: Arc<WorkflowTaskPoller<MockService, FakeClock>>,
    shutdown: CancellationToken,
}

fn fixture(workflow_fn: WorkflowFn, activities: ActivityRegistry) -> Fixture {
    let service = Arc::new(MockService::new());
    let shutdown = CancellationToken::new();
    let (tunnel, _pool) = spawn_local_activity_pool(activities, 8, shutdown.clone());

    let mut workflows = WorkflowRegistry::new();
    workflows.register("TestWorkflow", workflow_fn);

    let config = Arc::new(
        crate::config::WorkerConfig::builder("default", "orders")
            .identity("wf-worker")
            .build(),
    );
    let poller = Arc::new(WorkflowTaskPoller {
        service: service.clone(),
        config,
        workflows,
        cache: Arc::new(StickyCache::new(10)),
        tunnel,
        counters: Arc::new(Mutex::new(PollCounters::default())),
        call_policy: CallPolicy::default(),
        shutdown: shutdown.clone(),
        clock: FakeClock::new(),
        propagators: Arc::new(Vec::new()),
    });
    Fixture { service, poller, shutdown }
}

fn first_task() -> WorkflowTask {
    WorkflowTask::builder()
        .started_event_id(2)
        .history(vec![
            HistoryEvent::new(
                1,
                1_000,
                EventAttrs::WorkflowStarted {
                    workflow_type: "TestWorkflow".into(),
                    input: Payloads::new(),
                    workflow_task_timeout_ms: 10_000,
                    header: Default::default(),
                },
            ),
            HistoryEvent::new(2, 1_000, EventAttrs::WorkflowTaskStarted {}),
        ])
        .build()
}

fn second_task(execution: WorkflowExecution) -> WorkflowTask {
    WorkflowTask::builder()
        .execution(execution)
        .previous_started_event_id(2)
        .started_event_id(6)
        .history(vec![
            HistoryEvent::new(3, 1_000, EventAttrs::WorkflowTaskCompleted {}),
            HistoryEvent::new(4, 1_000, EventAttrs::TimerStarted { timer_id: TimerId::new("1") }),
            HistoryEvent::new(5, 31_000, EventAttrs::TimerFired { timer_id: TimerId::new("1") }),
            HistoryEvent::new(6, 31_000, EventAttrs::WorkflowTaskStarted {}),
        ])
        .build()
}

#[tokio::test]
async fn first_task_produces_start_timer_and_caches_context() {
    let fx = fixture(timer_workflow(), ActivityRegistry::new());
    let task = first_task();
    let execution = task.execution.clone();
    fx.poller.process_task(task).await;

    let completed = fx.service.completed_requests();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].decisions.len(), 1);
    assert_eq!(completed[0].decisions[0].name(), "timer:start");
    assert!(completed[0].sticky_attributes.is_some());
    assert!(!completed[0].force_create_new_task);

    // The context stayed cached for the sticky follow-up.
    assert_eq!(fx.poller.cache.len(), 1);
    fx.poller.process_task(second_task(execution)).await;

    let completed = fx.service.completed_requests();
    assert_eq!(completed.len(), 2);
    assert_eq!(completed[1].decisions.len(), 1);
    assert_eq!(completed[1].decisions[0].name(), "workflow:complete");
    // Closed workflows are not worth caching.
    assert_eq!(fx.poller.cache.len(), 0);
    fx.shutdown.cancel();
}

#[tokio::test]
async fn cache_miss_with_midstream_history_refetches_from_service() {
    let fx = fixture(timer_workflow(), ActivityRegistry::new());
    let execution = first_task().execution;

    // Full history lives on the service; the delivered task only carries
    // the delta, as the sticky queue would.
    fx.service.set_history(
        execution.run_id.as_str(),
        vec![
            HistoryEvent::new(
                1,
                1_000,
                EventAttrs::WorkflowStarted {
                    workflow_type: "TestWorkflow".into(),
                    input: Payloads::new(),
                    workflow_task_timeout_ms: 10_000,
                    header: Default::default(),
                },
            ),
            HistoryEvent::new(2, 1_000, EventAttrs::WorkflowTaskStarted {}),
            HistoryEvent::new(3, 1_000, EventAttrs::WorkflowTaskCompleted {}),
            HistoryEvent::new(4, 1_000, EventAttrs::TimerStarted { timer_id: TimerId::new("1") }),
            HistoryEvent::new(5, 31_000, EventAttrs::TimerFired { timer_id: TimerId::new("1") }),
            HistoryEvent::new(6, 31_000, EventAttrs::WorkflowTaskStarted {}),
        ],
    );
    let task = second_task(execution);
    fx.poller.process_task(task).await;

    let completed = fx.service.completed_requests();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].decisions[0].name(), "workflow:complete");
    fx.shutdown.cancel();
}

#[tokio::test]
async fn unregistered_workflow_fails_only_the_first_attempt() {
    let fx = fixture(timer_workflow(), ActivityRegistry::new());
    let mut task = first_task();
    task.workflow_type = "UnknownWorkflow".into();
    fx.poller.process_task(task.clone()).await;
    assert_eq!(fx.service.failed_requests().len(), 1);

    // Second attempt of the same failing task: stay silent, let it time
    // out so the service throttles the workflow.
    task.attempt = 2;
    fx.poller.process_task(task).await;
    assert_eq!(fx.service.failed_requests().len(), 1);
    fx.shutdown.cancel();
}

#[tokio::test]
async fn local_activity_merges_marker_before_completion() {
    let mut activities = ActivityRegistry::new();
    activities.register(
        "Quick",
        Arc::new(|_ctx, _input| {
            Box::pin(async {
                Ok(ActivityResult::Completed(
                    Payloads::single(&json!("la-done")).unwrap_or_default(),
                ))
            })
        }),
    );
    let workflow: WorkflowFn = Arc::new(|api, _input| {
        Box::pin(async move {
            api.local_activity(wl_engine::LocalActivityOptions::new("Quick", Payloads::new()))
                .await
        })
    });

    let fx = fixture(workflow, activities);
    fx.poller.process_task(first_task()).await;

    let completed = fx.service.completed_requests();
    assert_eq!(completed.len(), 1);
    let names: Vec<_> = completed[0].decisions.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["marker:record", "workflow:complete"]);
    fx.shutdown.cancel();
}

#[tokio::test]
async fn query_only_task_responds_without_decisions() {
    let workflow: WorkflowFn = Arc::new(|api, _input| {
        Box::pin(async move {
            api.set_query_handler("status", |_args| {
                Payloads::single(&json!("waiting")).map_err(|e| {
                    wl_core::error::WorkflowError::application(e.to_string())
                })
            });
            api.timer(Duration::from_secs(60)).await?;
            Ok(Payloads::new())
        })
    });
    let fx = fixture(workflow, ActivityRegistry::new());

    // Prime the cache with a normal task first.
    let task = first_task();
    let execution = task.execution.clone();
    fx.poller.process_task(task).await;

    let query_task = WorkflowTask::builder()
        .execution(execution)
        .query(WorkflowQuery { query_type: "status".into(), args: Payloads::new() })
        .build();
    fx.poller.process_task(query_task).await;

    let responses = fx.service.query_responses();
    assert_eq!(responses.len(), 1);
    assert_eq!(
        responses[0].result.as_ref().unwrap().decode_at::<String>(0).unwrap(),
        "waiting"
    );
    assert!(responses[0].error_message.is_none());
    // Query tasks never produce decisions.
    assert_eq!(fx.service.completed_requests().len(), 1);
    fx.shutdown.cancel();
}

#[tokio::test]
async fn replay_error_evicts_and_fails_first_attempt() {
    // A workflow that starts two timers with the same explicit ID would be
    // a machine-level duplicate; simulate the fatal path with a corrupted
    // history instead: a timer fired for a machine that never existed.
    let fx = fixture(timer_workflow(), ActivityRegistry::new());
    let task = first_task();
    let execution = task.execution.clone();
    fx.poller.process_task(task).await;
    assert_eq!(fx.poller.cache.len(), 1);

    let bad_task = WorkflowTask::builder()
        .execution(execution)
        .previous_started_event_id(2)
        .started_event_id(5)
        .history(vec![
            HistoryEvent::new(3, 1_000, EventAttrs::WorkflowTaskCompleted {}),
            HistoryEvent::new(
                4,
                1_000,
                EventAttrs::TimerFired { timer_id: TimerId::new("ghost") },
            ),
            HistoryEvent::new(5, 1_000, EventAttrs::WorkflowTaskStarted {}),
        ])
        .build();
    fx.poller.process_task(bad_task).await;

    let failed = fx.service.failed_requests();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].cause.contains("machine not found"));
    // The poisoned context is gone from the cache.
    assert_eq!(fx.poller.cache.len(), 0);
    fx.shutdown.cancel();
}
