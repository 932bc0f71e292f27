// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::machine::{MachineId, MachineOutcome, WakeHandle};
use crate::registry::MachineRegistry;
use crate::state::MachineState;
use crate::MachineError;
use std::collections::HashMap;
use wl_core::execution::ActivityId;
use wl_core::payload::Payloads;
use wl_core::retry::RetryState;
use wl_proto::{Decision, EventAttrs, HistoryEvent};

fn schedule_decision(id: &str) -> Decision {
    Decision::ScheduleActivity {
        activity_id: ActivityId::new(id),
        activity_type: "Charge".into(),
        task_list: "orders".into(),
        input: Payloads::new(),
        schedule_to_close_ms: None,
        schedule_to_start_ms: None,
        start_to_close_ms: 10_000,
        heartbeat_timeout_ms: None,
        retry_policy: None,
        header: HashMap::new(),
    }
}

fn registry_with_activity(id: &str) -> MachineRegistry {
    let mut registry = MachineRegistry::new();
    registry
        .schedule_activity(ActivityId::new(id), schedule_decision(id), Some(WakeHandle(7)))
        .unwrap();
    registry
}

fn event(attrs: EventAttrs) -> HistoryEvent {
    HistoryEvent::new(20, 0, attrs)
}

fn scheduled(id: &str) -> HistoryEvent {
    event(EventAttrs::ActivityScheduled {
        activity_id: ActivityId::new(id),
        activity_type: "Charge".into(),
    })
}

fn started(id: &str) -> HistoryEvent {
    event(EventAttrs::ActivityStarted { activity_id: ActivityId::new(id), identity: "w1".into() })
}

fn completed(id: &str) -> HistoryEvent {
    event(EventAttrs::ActivityCompleted {
        activity_id: ActivityId::new(id),
        result: Payloads::single(&serde_json::json!("paid")).unwrap(),
    })
}

#[test]
fn happy_path() {
    let mut registry = registry_with_activity("1");
    let decisions = registry.take_decisions();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].name(), "activity:schedule");

    registry.handle_event(&scheduled("1")).unwrap();
    registry.handle_event(&started("1")).unwrap();
    let resolutions = registry.handle_event(&completed("1")).unwrap();
    assert!(matches!(resolutions[0].outcome, MachineOutcome::Completed { .. }));
    assert_eq!(registry.state_of(&MachineId::activity("1")), Some(MachineState::Completed));
}

#[test]
fn completion_without_started_is_legal() {
    let mut registry = registry_with_activity("1");
    registry.take_decisions();
    registry.handle_event(&scheduled("1")).unwrap();
    let resolutions = registry.handle_event(&completed("1")).unwrap();
    assert_eq!(resolutions.len(), 1);
}

#[test]
fn cancel_then_complete_race_observes_success() {
    // Spec scenario: schedule, flush, cancel before the scheduled event,
    // then scheduled arrives, flush emits the cancel request, then the
    // completion arrives anyway.
    let mut registry = registry_with_activity("A");
    assert_eq!(registry.take_decisions().len(), 1);

    assert!(registry.request_cancel_activity(&ActivityId::new("A")).unwrap().is_none());
    assert_eq!(
        registry.state_of(&MachineId::activity("A")),
        Some(MachineState::CanceledBeforeInitiated)
    );

    registry.handle_event(&scheduled("A")).unwrap();
    let decisions = registry.take_decisions();
    assert_eq!(
        decisions,
        vec![Decision::RequestCancelActivity { activity_id: ActivityId::new("A") }]
    );

    let resolutions = registry.handle_event(&completed("A")).unwrap();
    assert!(matches!(resolutions[0].outcome, MachineOutcome::Completed { .. }));
    assert_eq!(
        registry.state_of(&MachineId::activity("A")),
        Some(MachineState::CompletedAfterCancellationDecisionSent)
    );
}

#[test]
fn cancel_before_sent_resolves_immediately() {
    let mut registry = registry_with_activity("1");
    let resolution = registry.request_cancel_activity(&ActivityId::new("1")).unwrap();
    assert!(matches!(
        resolution.map(|r| r.outcome),
        Some(MachineOutcome::Canceled { .. })
    ));
    assert!(registry.take_decisions().is_empty());
    assert_eq!(registry.state_of(&MachineId::activity("1")), Some(MachineState::Completed));
}

#[test]
fn cancel_after_started_full_cycle() {
    let mut registry = registry_with_activity("1");
    registry.take_decisions();
    registry.handle_event(&scheduled("1")).unwrap();
    registry.handle_event(&started("1")).unwrap();

    registry.request_cancel_activity(&ActivityId::new("1")).unwrap();
    assert_eq!(
        registry.state_of(&MachineId::activity("1")),
        Some(MachineState::CanceledAfterStarted)
    );
    assert_eq!(registry.take_decisions().len(), 1);

    registry
        .handle_event(&event(EventAttrs::ActivityCancelRequested {
            activity_id: ActivityId::new("1"),
        }))
        .unwrap();

    let resolutions = registry
        .handle_event(&event(EventAttrs::ActivityCanceled {
            activity_id: ActivityId::new("1"),
            details: Payloads::new(),
        }))
        .unwrap();
    assert!(matches!(resolutions[0].outcome, MachineOutcome::Canceled { .. }));
    assert_eq!(registry.state_of(&MachineId::activity("1")), Some(MachineState::Completed));
}

#[test]
fn failure_resolves_with_wire_failure() {
    let mut registry = registry_with_activity("1");
    registry.take_decisions();
    registry.handle_event(&scheduled("1")).unwrap();

    let failure =
        wl_core::failure::encode_error(&wl_core::error::WorkflowError::application("declined"));
    let resolutions = registry
        .handle_event(&event(EventAttrs::ActivityFailed {
            activity_id: ActivityId::new("1"),
            failure: failure.clone(),
            retry_state: RetryState::MaximumAttemptsReached,
        }))
        .unwrap();
    assert_eq!(
        resolutions[0].outcome,
        MachineOutcome::Failed { failure, retry_state: RetryState::MaximumAttemptsReached }
    );
}

#[test]
fn completed_in_created_is_fatal() {
    let mut registry = registry_with_activity("1");
    let err = registry.handle_event(&completed("1")).unwrap_err();
    assert!(matches!(err, MachineError::InvalidTransition { .. }));
}

#[test]
fn unknown_activity_event_is_fatal() {
    let mut registry = MachineRegistry::new();
    let err = registry.handle_event(&completed("ghost")).unwrap_err();
    assert_eq!(err, MachineError::NotFound(MachineId::activity("ghost")));
}
