// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::{TimeoutKind, WorkflowError};
use crate::payload::Payloads;
use yare::parameterized;

fn policy() -> RetryPolicy {
    RetryPolicy {
        initial_interval: Duration::from_secs(1),
        backoff_coefficient: 2.0,
        max_interval: Duration::from_secs(60),
        max_attempts: 10,
        non_retryable_error_types: vec!["CustomA".to_string()],
    }
}

#[parameterized(
    first = { 1, 1 },
    second = { 2, 2 },
    third = { 3, 4 },
    fifth = { 5, 16 },
    capped = { 10, 60 },
)]
fn backoff_grows_and_caps(attempt: u32, expected_secs: u64) {
    assert_eq!(policy().backoff(attempt), Duration::from_secs(expected_secs));
}

#[test]
fn backoff_coefficient_below_one_is_clamped() {
    let p = RetryPolicy { backoff_coefficient: 0.5, ..policy() };
    assert_eq!(p.backoff(5), Duration::from_secs(1));
}

#[test]
fn retryable_error_gets_a_delay() {
    let err = WorkflowError::application("transient");
    let decision = policy().next_attempt(1, &err, Duration::ZERO, None);
    assert_eq!(decision, RetryDecision::Retry { delay: Duration::from_secs(1) });
}

#[test]
fn non_retryable_type_stops_immediately() {
    let err = WorkflowError::Application {
        message: "boom".into(),
        error_type: "CustomA".into(),
        non_retryable: false,
        details: Payloads::new(),
        cause: None,
    };
    let decision = policy().next_attempt(1, &err, Duration::ZERO, None);
    assert_eq!(decision, RetryDecision::Stop { state: RetryState::NonRetryableFailure });
}

#[test]
fn flagged_non_retryable_stops_immediately() {
    let err = WorkflowError::Application {
        message: "boom".into(),
        error_type: String::new(),
        non_retryable: true,
        details: Payloads::new(),
        cause: None,
    };
    let decision = policy().next_attempt(1, &err, Duration::ZERO, None);
    assert_eq!(decision, RetryDecision::Stop { state: RetryState::NonRetryableFailure });
}

#[test]
fn canceled_never_retries() {
    let decision = policy().next_attempt(1, &WorkflowError::canceled(), Duration::ZERO, None);
    assert_eq!(decision, RetryDecision::Stop { state: RetryState::NonRetryableFailure });
}

#[test]
fn schedule_to_start_timeout_never_retries() {
    let err = WorkflowError::timeout(TimeoutKind::ScheduleToStart);
    let decision = policy().next_attempt(1, &err, Duration::ZERO, None);
    assert_eq!(decision, RetryDecision::Stop { state: RetryState::NonRetryableFailure });
}

#[test]
fn max_attempts_reached() {
    let err = WorkflowError::application("transient");
    let decision = policy().next_attempt(10, &err, Duration::ZERO, None);
    assert_eq!(decision, RetryDecision::Stop { state: RetryState::MaximumAttemptsReached });
}

#[test]
fn budget_exhaustion_yields_timeout() {
    let err = WorkflowError::application("transient");
    // Attempt 3 wants 4s of backoff but only 2s of budget remain.
    let decision = policy().next_attempt(
        3,
        &err,
        Duration::from_secs(8),
        Some(Duration::from_secs(10)),
    );
    assert_eq!(decision, RetryDecision::Stop { state: RetryState::Timeout });
}

#[test]
fn budget_with_room_retries() {
    let err = WorkflowError::application("transient");
    let decision = policy().next_attempt(
        2,
        &err,
        Duration::from_secs(1),
        Some(Duration::from_secs(60)),
    );
    assert_eq!(decision, RetryDecision::Retry { delay: Duration::from_secs(2) });
}

#[test]
fn policy_serde_roundtrip_uses_millis() {
    let p = policy();
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["initial_interval"], 1000);
    assert_eq!(json["max_interval"], 60_000);
    let back: RetryPolicy = serde_json::from_value(json).unwrap();
    assert_eq!(back, p);
}
