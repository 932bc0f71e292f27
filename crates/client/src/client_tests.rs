// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::mock::MockService;
use wl_proto::{EventAttrs, HistoryEvent, WorkflowExecutionInfo, WorkflowExecutionStatus};

fn client(service: Arc<MockService>) -> WorkflowClient<MockService> {
    WorkflowClient::new(service, "default", "test-client")
}

#[tokio::test]
async fn start_workflow_returns_run_id() {
    let service = Arc::new(MockService::new());
    let client = client(service.clone());

    let run_id = client
        .start_workflow(StartOptions::new("order-1", "OrderWorkflow", "orders", Payloads::new()))
        .await
        .unwrap();
    assert!(run_id.as_str().starts_with("run-"));

    let started = service.started_requests();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].workflow_id, "order-1");
    assert_eq!(started[0].namespace, "default");
    assert_eq!(started[0].identity, "test-client");
}

#[tokio::test]
async fn start_retries_transient_failures() {
    let service = Arc::new(MockService::new());
    service.fail_next_start(RpcError::Unavailable("warming up".into()));
    let client = client(service.clone());

    let result = client
        .start_workflow(StartOptions::new("order-2", "OrderWorkflow", "orders", Payloads::new()))
        .await;
    assert!(result.is_ok());
    assert_eq!(service.started_requests().len(), 1);
}

#[tokio::test]
async fn start_surfaces_non_transient_as_execution_error() {
    let service = Arc::new(MockService::new());
    service.fail_next_start(RpcError::AlreadyExists("order-3".into()));
    let client = client(service.clone());

    let err = client
        .start_workflow(StartOptions::new("order-3", "OrderWorkflow", "orders", Payloads::new()))
        .await
        .unwrap_err();
    assert_eq!(err.workflow_type, "OrderWorkflow");
    assert_eq!(err.cause, RpcError::AlreadyExists("order-3".into()));
    assert!(err.to_string().contains("OrderWorkflow"));
}

#[tokio::test]
async fn signal_with_start_records_the_start() {
    let service = Arc::new(MockService::new());
    let client = client(service.clone());
    let run_id = client
        .signal_with_start(
            StartOptions::new("order-4", "OrderWorkflow", "orders", Payloads::new()),
            "wake",
            Payloads::new(),
        )
        .await
        .unwrap();
    assert!(!run_id.is_empty());
    assert_eq!(service.started_requests().len(), 1);
}

#[tokio::test]
async fn get_history_returns_scripted_events() {
    let service = Arc::new(MockService::new());
    service.set_history(
        "run-h",
        vec![HistoryEvent::new(1, 0, EventAttrs::WorkflowTaskStarted {})],
    );
    let client = client(service.clone());

    let events = client
        .get_history(WorkflowExecution::new("wf", RunId::from_string("run-h")))
        .await
        .unwrap();
    assert_eq!(events.len(), 1);

    let missing = client
        .get_history(WorkflowExecution::new("wf", RunId::from_string("run-missing")))
        .await;
    assert!(matches!(missing, Err(RpcError::NotFound(_))));
}

#[tokio::test]
async fn list_scan_count_share_the_visibility_store() {
    let service = Arc::new(MockService::new());
    service.add_execution_info(WorkflowExecutionInfo {
        execution: WorkflowExecution::new("wf", RunId::from_string("run-1")),
        workflow_type: "W".into(),
        status: WorkflowExecutionStatus::Running,
        start_time_ms: 1,
        close_time_ms: None,
    });
    let client = client(service.clone());

    assert_eq!(client.list("status = 'running'", 10).await.unwrap().executions.len(), 1);
    assert_eq!(client.scan("", 10).await.unwrap().executions.len(), 1);
    assert_eq!(client.count("").await.unwrap(), 1);
}
