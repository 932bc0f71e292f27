// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::is_retryable;
use crate::execution::RunId;
use crate::payload::Payload;
use serde_json::json;

fn roundtrip(err: &WorkflowError) -> WorkflowError {
    decode_failure(&encode_error(err))
}

#[test]
fn application_roundtrip_with_cause_chain() {
    let err = WorkflowError::Application {
        message: "boom".into(),
        error_type: "CustomA".into(),
        non_retryable: true,
        details: Payloads::from_values(&[json!("x"), json!(42)]).unwrap(),
        cause: Some(Box::new(WorkflowError::application("inner"))),
    };
    let back = roundtrip(&err);
    assert_eq!(back, err);

    // Cause is reachable through the chain accessor too.
    assert_eq!(back.cause().map(|c| c.to_string()), Some("inner".to_string()));
}

#[test]
fn canceled_roundtrip() {
    let err = WorkflowError::Canceled {
        details: Payloads::from_values(&[json!("cleanup")]).unwrap(),
    };
    assert_eq!(roundtrip(&err), err);
}

#[test]
fn timeout_roundtrip_preserves_kind_and_heartbeat() {
    let err = WorkflowError::Timeout {
        kind: TimeoutKind::Heartbeat,
        last_heartbeat: Payloads::from_values(&[json!(7)]).unwrap(),
        cause: None,
    };
    assert_eq!(roundtrip(&err), err);
}

#[test]
fn terminated_roundtrip() {
    let err = WorkflowError::Terminated { reason: "operator".into() };
    assert_eq!(roundtrip(&err), err);
}

#[test]
fn server_roundtrip() {
    let err = WorkflowError::Server { message: "shard lost".into(), non_retryable: true };
    assert_eq!(roundtrip(&err), err);
}

#[test]
fn activity_wrapper_roundtrip() {
    let err = WorkflowError::Activity {
        scheduled_event_id: 5,
        started_event_id: 6,
        identity: "worker-1".into(),
        activity_type: "Charge".into(),
        activity_id: "1".into(),
        retry_state: RetryState::NonRetryableFailure,
        cause: Box::new(WorkflowError::application("declined")),
    };
    assert_eq!(roundtrip(&err), err);
}

#[test]
fn child_workflow_wrapper_roundtrip() {
    let err = WorkflowError::ChildWorkflow {
        namespace: "default".into(),
        execution: WorkflowExecution::new("child-1", RunId::from_string("run-c")),
        workflow_type: "Refund".into(),
        initiated_event_id: 9,
        started_event_id: 10,
        retry_state: RetryState::MaximumAttemptsReached,
        cause: Box::new(WorkflowError::timeout(TimeoutKind::StartToClose)),
    };
    assert_eq!(roundtrip(&err), err);
}

#[test]
fn panic_encodes_as_non_retryable_application() {
    let err = WorkflowError::panic("index out of bounds", "stack...");
    let failure = encode_error(&err);
    assert_eq!(
        failure.info,
        FailureInfo::Application {
            error_type: PANIC_ERROR_TYPE.to_string(),
            non_retryable: true,
            details: Payloads::new(),
        }
    );
    assert_eq!(failure.stack_trace, "stack...");
    assert_eq!(decode_failure(&failure), err);
}

#[test]
fn unknown_info_decodes_to_retryable_application() {
    let wire = json!({
        "message": "novel failure",
        "info": {"type": "nexus_operation", "endpoint": "ep"}
    });
    let failure: Failure = serde_json::from_value(wire).unwrap();
    match decode_failure(&failure) {
        WorkflowError::Application { error_type, non_retryable, .. } => {
            assert_eq!(error_type, "nexus_operation");
            assert!(!non_retryable);
        }
        other => panic!("expected application, got {other:?}"),
    }
}

#[test]
fn failure_serde_roundtrip() {
    let err = WorkflowError::Application {
        message: "boom".into(),
        error_type: "T".into(),
        non_retryable: false,
        details: Payloads(vec![Payload::raw(b"blob".to_vec())]),
        cause: Some(Box::new(WorkflowError::canceled())),
    };
    let failure = encode_error(&err);
    let json = serde_json::to_string(&failure).unwrap();
    let back: Failure = serde_json::from_str(&json).unwrap();
    assert_eq!(back, failure);
}

#[test]
fn is_retryable_matrix() {
    let none: &[String] = &[];
    assert!(!is_retryable(&WorkflowError::canceled(), none));
    assert!(!is_retryable(&WorkflowError::Terminated { reason: String::new() }, none));
    assert!(!is_retryable(&WorkflowError::panic("p", ""), none));
    assert!(!is_retryable(&WorkflowError::timeout(TimeoutKind::ScheduleToClose), none));
    assert!(is_retryable(&WorkflowError::timeout(TimeoutKind::StartToClose), none));
    assert!(is_retryable(&WorkflowError::timeout(TimeoutKind::Heartbeat), none));
    assert!(is_retryable(&WorkflowError::application("e"), none));

    let listed = vec!["CustomA".to_string()];
    let custom = WorkflowError::Application {
        message: "m".into(),
        error_type: "CustomA".into(),
        non_retryable: false,
        details: Payloads::new(),
        cause: None,
    };
    assert!(!is_retryable(&custom, &listed));
    assert!(is_retryable(&custom, none));
}
