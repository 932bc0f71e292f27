// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::payload::Payloads;
use crate::retry::RetryState;

#[test]
fn display_shows_message() {
    assert_eq!(WorkflowError::application("boom").to_string(), "boom");
    assert_eq!(WorkflowError::canceled().to_string(), "canceled");
    assert_eq!(
        WorkflowError::timeout(TimeoutKind::StartToClose).to_string(),
        "start_to_close timeout"
    );
}

#[test]
fn cause_chain_traversal() {
    let inner = WorkflowError::application("inner");
    let outer = WorkflowError::Activity {
        scheduled_event_id: 1,
        started_event_id: 2,
        identity: "w".into(),
        activity_type: "A".into(),
        activity_id: "1".into(),
        retry_state: RetryState::NonRetryableFailure,
        cause: Box::new(WorkflowError::Application {
            message: "mid".into(),
            error_type: String::new(),
            non_retryable: false,
            details: Payloads::new(),
            cause: Some(Box::new(inner.clone())),
        }),
    };
    assert_eq!(outer.root_cause(), &inner);
}

#[test]
fn kind_mapping() {
    assert_eq!(WorkflowErrorKind::from(&WorkflowError::canceled()), WorkflowErrorKind::Canceled);
    assert_eq!(
        WorkflowErrorKind::from(&WorkflowError::panic("p", "")).to_string(),
        "panic"
    );
}

#[test]
fn terminated_is_not_retryable_even_when_wrapped() {
    let wrapped = WorkflowError::Activity {
        scheduled_event_id: 1,
        started_event_id: 2,
        identity: "w".into(),
        activity_type: "A".into(),
        activity_id: "1".into(),
        retry_state: RetryState::InProgress,
        cause: Box::new(WorkflowError::Terminated { reason: "gone".into() }),
    };
    assert!(!is_retryable(&wrapped, &[]));
}

#[test]
fn is_canceled_only_for_canceled() {
    assert!(WorkflowError::canceled().is_canceled());
    assert!(!WorkflowError::application("x").is_canceled());
}
