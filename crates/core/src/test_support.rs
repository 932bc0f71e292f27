// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers and proptest strategies for other crates' tests.

use crate::error::{TimeoutKind, WorkflowError};
use crate::payload::Payloads;
use crate::retry::RetryState;
use proptest::prelude::*;
use serde_json::json;

/// Strategy over leaf (cause-free) workflow errors covering every variant
/// family that can appear at the bottom of a cause chain.
pub fn leaf_error() -> impl Strategy<Value = WorkflowError> {
    prop_oneof![
        ("[a-z]{1,12}", any::<bool>(), "[A-Z][a-z]{0,8}").prop_map(
            |(message, non_retryable, error_type)| WorkflowError::Application {
                message,
                error_type,
                non_retryable,
                details: Payloads::new(),
                cause: None,
            }
        ),
        Just(WorkflowError::canceled()),
        timeout_kind().prop_map(WorkflowError::timeout),
        "[a-z]{1,12}".prop_map(|reason| WorkflowError::Terminated { reason }),
        ("[a-z]{1,12}", any::<bool>()).prop_map(|(message, non_retryable)| {
            WorkflowError::Server { message, non_retryable }
        }),
        ("[a-z]{1,12}",).prop_map(|(m,)| WorkflowError::panic(m, "")),
    ]
}

pub fn timeout_kind() -> impl Strategy<Value = TimeoutKind> {
    prop_oneof![
        Just(TimeoutKind::ScheduleToStart),
        Just(TimeoutKind::ScheduleToClose),
        Just(TimeoutKind::StartToClose),
        Just(TimeoutKind::Heartbeat),
    ]
}

pub fn retry_state() -> impl Strategy<Value = RetryState> {
    prop_oneof![
        Just(RetryState::InProgress),
        Just(RetryState::NonRetryableFailure),
        Just(RetryState::Timeout),
        Just(RetryState::MaximumAttemptsReached),
        Just(RetryState::CancelRequested),
    ]
}

/// Errors with up to three levels of cause nesting.
pub fn chained_error() -> impl Strategy<Value = WorkflowError> {
    leaf_error().prop_recursive(3, 6, 1, |inner| {
        (inner, "[a-z]{1,12}").prop_map(|(cause, message)| WorkflowError::Application {
            message,
            error_type: String::new(),
            non_retryable: false,
            details: Payloads::new(),
            cause: Some(Box::new(cause)),
        })
    })
}

/// Small payload list with mixed value shapes.
pub fn sample_details() -> Payloads {
    match Payloads::from_values(&[json!("x"), json!(42), json!({"nested": true})]) {
        Ok(p) => p,
        Err(_) => Payloads::new(),
    }
}
