// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::machine::{MachineId, MachineKind, MachineOutcome, WakeHandle};
use crate::registry::MachineRegistry;
use crate::state::MachineState;
use crate::MachineError;
use std::collections::HashMap;
use wl_core::execution::WorkflowId;
use wl_core::payload::Payloads;
use wl_proto::{Decision, EventAttrs, HistoryEvent};

fn event(attrs: EventAttrs) -> HistoryEvent {
    HistoryEvent::new(40, 0, attrs)
}

fn registry_with_signal(signal_id: &str) -> MachineRegistry {
    let mut registry = MachineRegistry::new();
    registry
        .signal_external(
            signal_id,
            Decision::SignalExternalWorkflow {
                signal_id: signal_id.into(),
                workflow_id: WorkflowId::new("target"),
                run_id: None,
                signal_name: "poke".into(),
                input: Payloads::new(),
                header: HashMap::new(),
            },
            Some(WakeHandle(2)),
        )
        .unwrap();
    registry
}

#[test]
fn signal_delivery() {
    let mut registry = registry_with_signal("3");
    assert_eq!(registry.take_decisions().len(), 1);

    registry
        .handle_event(&event(EventAttrs::ExternalSignalInitiated {
            signal_id: "3".into(),
            workflow_id: WorkflowId::new("target"),
            signal_name: "poke".into(),
        }))
        .unwrap();
    let resolutions = registry
        .handle_event(&event(EventAttrs::ExternalSignaled {
            signal_id: "3".into(),
            workflow_id: WorkflowId::new("target"),
        }))
        .unwrap();
    assert_eq!(resolutions[0].outcome, MachineOutcome::Delivered);
    assert_eq!(
        registry.state_of(&MachineId::new(MachineKind::ExternalSignal, "3")),
        Some(MachineState::Completed)
    );
}

#[test]
fn signal_delivery_failure() {
    let mut registry = registry_with_signal("3");
    registry.take_decisions();
    registry
        .handle_event(&event(EventAttrs::ExternalSignalInitiated {
            signal_id: "3".into(),
            workflow_id: WorkflowId::new("target"),
            signal_name: "poke".into(),
        }))
        .unwrap();
    let resolutions = registry
        .handle_event(&event(EventAttrs::ExternalSignalFailed {
            signal_id: "3".into(),
            workflow_id: WorkflowId::new("target"),
            cause: "workflow not found".into(),
        }))
        .unwrap();
    assert_eq!(
        resolutions[0].outcome,
        MachineOutcome::DeliveryFailed { cause: "workflow not found".into() }
    );
}

#[test]
fn delivered_before_initiated_is_fatal() {
    let mut registry = registry_with_signal("3");
    registry.take_decisions();
    let err = registry
        .handle_event(&event(EventAttrs::ExternalSignaled {
            signal_id: "3".into(),
            workflow_id: WorkflowId::new("target"),
        }))
        .unwrap_err();
    assert!(matches!(err, MachineError::InvalidTransition { .. }));
}

#[test]
fn external_cancel_failure_resolves_cause() {
    let mut registry = MachineRegistry::new();
    registry
        .request_cancel_external(
            "9",
            Decision::RequestCancelExternalWorkflow {
                cancel_id: "9".into(),
                workflow_id: WorkflowId::new("gone"),
                run_id: None,
            },
            Some(WakeHandle(4)),
        )
        .unwrap();
    registry.take_decisions();

    registry
        .handle_event(&event(EventAttrs::ExternalCancelInitiated {
            cancel_id: "9".into(),
            workflow_id: WorkflowId::new("gone"),
            run_id: None,
        }))
        .unwrap();
    let resolutions = registry
        .handle_event(&event(EventAttrs::ExternalCancelFailed {
            cancel_id: "9".into(),
            workflow_id: WorkflowId::new("gone"),
            cause: "not found".into(),
        }))
        .unwrap();
    assert_eq!(
        resolutions[0].outcome,
        MachineOutcome::DeliveryFailed { cause: "not found".into() }
    );
}
