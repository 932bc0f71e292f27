// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::machine::{MachineId, MachineOutcome, WakeHandle};
use crate::registry::MachineRegistry;
use crate::state::MachineState;
use crate::MachineError;
use wl_core::execution::TimerId;
use wl_proto::{Decision, EventAttrs, HistoryEvent};

fn started(id: &str) -> HistoryEvent {
    HistoryEvent::new(10, 0, EventAttrs::TimerStarted { timer_id: TimerId::new(id) })
}

fn fired(id: &str) -> HistoryEvent {
    HistoryEvent::new(11, 0, EventAttrs::TimerFired { timer_id: TimerId::new(id) })
}

fn canceled(id: &str) -> HistoryEvent {
    HistoryEvent::new(12, 0, EventAttrs::TimerCanceled { timer_id: TimerId::new(id) })
}

fn registry_with_timer(id: &str) -> MachineRegistry {
    let mut registry = MachineRegistry::new();
    registry
        .start_timer(TimerId::new(id), 30_000, Some(WakeHandle(1)))
        .unwrap();
    registry
}

#[test]
fn happy_path_fires() {
    let mut registry = registry_with_timer("t1");
    assert_eq!(registry.take_decisions().len(), 1);
    assert!(registry.handle_event(&started("t1")).unwrap().is_empty());

    let resolutions = registry.handle_event(&fired("t1")).unwrap();
    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0].outcome, MachineOutcome::Fired);
    assert_eq!(registry.state_of(&MachineId::timer("t1")), Some(MachineState::Completed));
}

#[test]
fn cancel_before_sent_emits_nothing() {
    let mut registry = registry_with_timer("t1");
    let resolution = registry.cancel_timer(&TimerId::new("t1")).unwrap();
    assert!(matches!(
        resolution.map(|r| r.outcome),
        Some(MachineOutcome::Canceled { .. })
    ));
    assert_eq!(registry.state_of(&MachineId::timer("t1")), Some(MachineState::Completed));
    assert!(registry.take_decisions().is_empty());
}

#[test]
fn cancel_after_initiated_sends_cancel_decision() {
    let mut registry = registry_with_timer("t1");
    assert_eq!(registry.take_decisions().len(), 1);
    registry.handle_event(&started("t1")).unwrap();

    registry.cancel_timer(&TimerId::new("t1")).unwrap();
    assert_eq!(
        registry.state_of(&MachineId::timer("t1")),
        Some(MachineState::CanceledAfterInitiated)
    );

    let decisions = registry.take_decisions();
    assert_eq!(decisions, vec![Decision::CancelTimer { timer_id: TimerId::new("t1") }]);
    assert_eq!(
        registry.state_of(&MachineId::timer("t1")),
        Some(MachineState::CancellationDecisionSent)
    );

    registry.handle_event(&canceled("t1")).unwrap();
    assert_eq!(registry.state_of(&MachineId::timer("t1")), Some(MachineState::Completed));
}

#[test]
fn cancel_before_initiated_externalizes_on_started() {
    let mut registry = registry_with_timer("t1");
    assert_eq!(registry.take_decisions().len(), 1);

    // Cancel lands while the start decision is in flight.
    registry.cancel_timer(&TimerId::new("t1")).unwrap();
    assert_eq!(
        registry.state_of(&MachineId::timer("t1")),
        Some(MachineState::CanceledBeforeInitiated)
    );
    assert!(registry.take_decisions().is_empty());

    // The service acknowledges the start anyway; now we must cancel it.
    registry.handle_event(&started("t1")).unwrap();
    let decisions = registry.take_decisions();
    assert_eq!(decisions, vec![Decision::CancelTimer { timer_id: TimerId::new("t1") }]);

    registry.handle_event(&canceled("t1")).unwrap();
    assert_eq!(registry.state_of(&MachineId::timer("t1")), Some(MachineState::Completed));
}

#[test]
fn fire_beats_staged_cancel() {
    let mut registry = registry_with_timer("t1");
    registry.take_decisions();
    registry.handle_event(&started("t1")).unwrap();
    registry.cancel_timer(&TimerId::new("t1")).unwrap();

    // Fired arrives before the staged CancelTimer ever went out.
    let resolutions = registry.handle_event(&fired("t1")).unwrap();
    // Future already resolved canceled at cancel time.
    assert!(resolutions.is_empty());
    assert_eq!(registry.state_of(&MachineId::timer("t1")), Some(MachineState::Completed));
    assert!(registry.take_decisions().is_empty());
}

#[test]
fn fire_after_cancellation_decision_sent() {
    let mut registry = registry_with_timer("t1");
    registry.take_decisions();
    registry.handle_event(&started("t1")).unwrap();
    registry.cancel_timer(&TimerId::new("t1")).unwrap();
    registry.take_decisions();

    registry.handle_event(&fired("t1")).unwrap();
    assert_eq!(
        registry.state_of(&MachineId::timer("t1")),
        Some(MachineState::CompletedAfterCancellationDecisionSent)
    );
}

#[test]
fn cancel_failed_then_fire_completes() {
    let mut registry = registry_with_timer("t1");
    registry.take_decisions();
    registry.handle_event(&started("t1")).unwrap();
    registry.cancel_timer(&TimerId::new("t1")).unwrap();
    registry.take_decisions();

    let event = HistoryEvent::new(
        12,
        0,
        EventAttrs::CancelTimerFailed { timer_id: TimerId::new("t1"), cause: "too late".into() },
    );
    assert!(registry.handle_event(&event).unwrap().is_empty());

    registry.handle_event(&fired("t1")).unwrap();
    assert_eq!(
        registry.state_of(&MachineId::timer("t1")),
        Some(MachineState::CompletedAfterCancellationDecisionSent)
    );
}

#[test]
fn fired_without_started_is_fatal() {
    let mut registry = registry_with_timer("t1");
    registry.take_decisions();
    let err = registry.handle_event(&fired("t1")).unwrap_err();
    assert!(matches!(err, MachineError::InvalidTransition { .. }));
}

#[test]
fn duplicate_timer_id_is_fatal() {
    let mut registry = registry_with_timer("t1");
    let err = registry.start_timer(TimerId::new("t1"), 1, None).unwrap_err();
    assert_eq!(err, MachineError::Duplicate(MachineId::timer("t1")));
}

#[test]
fn double_cancel_is_noop() {
    let mut registry = registry_with_timer("t1");
    registry.take_decisions();
    registry.handle_event(&started("t1")).unwrap();
    registry.cancel_timer(&TimerId::new("t1")).unwrap();
    let second = registry.cancel_timer(&TimerId::new("t1")).unwrap();
    assert!(second.is_none());
    // Still exactly one cancel decision.
    assert_eq!(registry.take_decisions().len(), 1);
}
