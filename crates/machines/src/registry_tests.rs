// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::machine::MachineOutcome;
use std::collections::HashMap;
use wl_core::payload::Payloads;
use wl_proto::MARKER_LOCAL_ACTIVITY;

fn schedule(id: &str) -> Decision {
    Decision::ScheduleActivity {
        activity_id: ActivityId::new(id),
        activity_type: "A".into(),
        task_list: "tl".into(),
        input: Payloads::new(),
        schedule_to_close_ms: None,
        schedule_to_start_ms: None,
        start_to_close_ms: 1_000,
        heartbeat_timeout_ms: None,
        retry_policy: None,
        header: HashMap::new(),
    }
}

fn la_marker(id: &str) -> Decision {
    Decision::RecordMarker {
        marker_name: MARKER_LOCAL_ACTIVITY.into(),
        marker_id: id.into(),
        details: Payloads::new(),
        failure: None,
    }
}

#[test]
fn decisions_flush_in_creation_order() {
    let mut registry = MachineRegistry::new();
    registry.start_timer(TimerId::new("t1"), 100, None).unwrap();
    registry.schedule_activity(ActivityId::new("a1"), schedule("a1"), None).unwrap();
    registry.start_timer(TimerId::new("t2"), 200, None).unwrap();

    let names: Vec<_> = registry.take_decisions().iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["timer:start", "activity:schedule", "timer:start"]);
}

#[test]
fn flush_is_idempotent() {
    let mut registry = MachineRegistry::new();
    registry.start_timer(TimerId::new("t1"), 100, None).unwrap();
    assert_eq!(registry.take_decisions().len(), 1);
    // Re-entering the emitting state (task retry) must not re-emit.
    assert!(registry.take_decisions().is_empty());
}

#[test]
fn local_activity_markers_precede_cancellations() {
    let mut registry = MachineRegistry::new();
    // Creation order: timer, then its cancellation is staged, then the
    // local-activity marker that caused the cancel is recorded.
    registry.start_timer(TimerId::new("t1"), 100, None).unwrap();
    registry.take_decisions();
    registry
        .handle_event(&HistoryEvent::new(
            4,
            0,
            EventAttrs::TimerStarted { timer_id: TimerId::new("t1") },
        ))
        .unwrap();
    registry.cancel_timer(&TimerId::new("t1")).unwrap();
    registry.record_marker("la-1", la_marker("la-1")).unwrap();

    let names: Vec<_> = registry.take_decisions().iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["marker:record", "timer:cancel"]);
}

#[test]
fn plain_markers_are_not_hoisted() {
    let mut registry = MachineRegistry::new();
    registry.start_timer(TimerId::new("t1"), 100, None).unwrap();
    registry.take_decisions();
    registry
        .handle_event(&HistoryEvent::new(
            4,
            0,
            EventAttrs::TimerStarted { timer_id: TimerId::new("t1") },
        ))
        .unwrap();
    registry.cancel_timer(&TimerId::new("t1")).unwrap();
    registry
        .record_marker(
            "v-1",
            Decision::RecordMarker {
                marker_name: "version".into(),
                marker_id: "v-1".into(),
                details: Payloads::new(),
                failure: None,
            },
        )
        .unwrap();

    let names: Vec<_> = registry.take_decisions().iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["timer:cancel", "marker:record"]);
}

#[test]
fn terminal_decision_flushes_last_and_once() {
    let mut registry = MachineRegistry::new();
    registry.start_timer(TimerId::new("t1"), 100, None).unwrap();
    registry.set_terminal_decision(Decision::CompleteWorkflow { result: Payloads::new() });
    registry.set_terminal_decision(Decision::FailWorkflow {
        failure: wl_core::failure::encode_error(&wl_core::error::WorkflowError::application("x")),
    });

    let names: Vec<_> = registry.take_decisions().iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["timer:start", "workflow:complete"]);
    assert!(registry.workflow_closed());
    assert!(registry.take_decisions().is_empty());
}

#[test]
fn external_cancel_machine_routing_beats_child_routing() {
    let mut registry = MachineRegistry::new();
    registry
        .request_cancel_external(
            "5",
            Decision::RequestCancelExternalWorkflow {
                cancel_id: "5".into(),
                workflow_id: WorkflowId::new("other-wf"),
                run_id: None,
            },
            Some(WakeHandle(3)),
        )
        .unwrap();
    registry.take_decisions();

    registry
        .handle_event(&HistoryEvent::new(
            9,
            0,
            EventAttrs::ExternalCancelInitiated {
                cancel_id: "5".into(),
                workflow_id: WorkflowId::new("other-wf"),
                run_id: None,
            },
        ))
        .unwrap();
    let resolutions = registry
        .handle_event(&HistoryEvent::new(
            10,
            0,
            EventAttrs::ExternalCancelRequested {
                cancel_id: "5".into(),
                workflow_id: WorkflowId::new("other-wf"),
            },
        ))
        .unwrap();
    assert_eq!(resolutions[0].outcome, MachineOutcome::Delivered);
}

#[test]
fn marker_event_without_machine_is_ignored() {
    let mut registry = MachineRegistry::new();
    let resolutions = registry
        .handle_event(&HistoryEvent::new(
            3,
            0,
            EventAttrs::MarkerRecorded {
                marker_name: "side_effect".into(),
                marker_id: "1".into(),
                details: Payloads::new(),
                failure: None,
            },
        ))
        .unwrap();
    assert!(resolutions.is_empty());
}

#[test]
fn has_pending_decisions_tracks_flush_state() {
    let mut registry = MachineRegistry::new();
    assert!(!registry.has_pending_decisions());
    registry.start_timer(TimerId::new("t1"), 100, None).unwrap();
    assert!(registry.has_pending_decisions());
    registry.take_decisions();
    assert!(!registry.has_pending_decisions());
}

#[test]
fn degenerate_marker_completes_on_flush() {
    let mut registry = MachineRegistry::new();
    registry.record_marker("m1", la_marker("m1")).unwrap();
    registry.take_decisions();
    assert_eq!(
        registry.state_of(&MachineId::new(MachineKind::Marker, "m1")),
        Some(MachineState::Completed)
    );
    assert!(registry.all_terminal());
}
