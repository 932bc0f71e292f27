// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child workflow machine transitions.
//!
//! A child is canceled through the external-cancel decision targeting its
//! workflow ID; the service reports the cancellation's progress back through
//! `external_cancel:*` events (routed here) and finally `child:canceled`.

use crate::machine::{CancelEffect, MachineEntry, MachineError, MachineOutcome, MachineResolution};
use crate::state::MachineState;
use wl_core::execution::WorkflowId;
use wl_proto::{Decision, EventAttrs};

pub(crate) fn apply(
    entry: &mut MachineEntry,
    attrs: &EventAttrs,
) -> Result<Option<MachineResolution>, MachineError> {
    match attrs {
        EventAttrs::ChildWorkflowInitiated { .. } => match entry.state {
            MachineState::DecisionSent => {
                entry.state = MachineState::Initiated;
                Ok(None)
            }
            MachineState::CanceledBeforeInitiated => {
                entry.state = MachineState::CanceledAfterInitiated;
                entry.cancel_decision = Some(cancel_decision(entry));
                Ok(None)
            }
            _ => Err(entry.invalid("child:initiated")),
        },
        EventAttrs::ChildWorkflowStarted { .. } => match entry.state {
            MachineState::Initiated => {
                entry.state = MachineState::Started;
                Ok(None)
            }
            MachineState::CanceledAfterInitiated => {
                entry.state = MachineState::CanceledAfterStarted;
                Ok(None)
            }
            MachineState::CancellationDecisionSent => Ok(None),
            _ => Err(entry.invalid("child:started")),
        },
        EventAttrs::ChildWorkflowCompleted { result, .. } => terminal(
            entry,
            "child:completed",
            MachineOutcome::Completed { result: result.clone() },
        ),
        EventAttrs::ChildWorkflowFailed { failure, retry_state, .. } => terminal(
            entry,
            "child:failed",
            MachineOutcome::Failed { failure: failure.clone(), retry_state: *retry_state },
        ),
        EventAttrs::ChildWorkflowTimedOut { timeout_kind, retry_state, .. } => terminal(
            entry,
            "child:timed_out",
            MachineOutcome::TimedOut {
                kind: *timeout_kind,
                last_heartbeat: wl_core::payload::Payloads::new(),
                retry_state: *retry_state,
            },
        ),
        EventAttrs::ChildWorkflowTerminated { .. } => {
            terminal(entry, "child:terminated", MachineOutcome::Terminated)
        }
        EventAttrs::ChildWorkflowCanceled { details, .. } => match entry.state {
            // Cancellation succeeded: ordinary completion of the machine.
            MachineState::CancellationDecisionSent => {
                entry.state = MachineState::Completed;
                Ok(entry.resolve(MachineOutcome::Canceled { details: details.clone() }))
            }
            _ => Err(entry.invalid("child:canceled")),
        },
        // Progress of our cancellation request against this child.
        EventAttrs::ExternalCancelInitiated { .. }
        | EventAttrs::ExternalCancelRequested { .. } => match entry.state {
            MachineState::CancellationDecisionSent => Ok(None),
            _ => Err(entry.invalid("external_cancel progress")),
        },
        // The cancel could not be delivered; the child runs on to its own
        // outcome.
        EventAttrs::ExternalCancelFailed { .. } => match entry.state {
            MachineState::CancellationDecisionSent => Ok(None),
            _ => Err(entry.invalid("external_cancel:failed")),
        },
        _ => Err(entry.invalid("unexpected event kind")),
    }
}

fn terminal(
    entry: &mut MachineEntry,
    event: &'static str,
    outcome: MachineOutcome,
) -> Result<Option<MachineResolution>, MachineError> {
    match entry.state {
        MachineState::Initiated | MachineState::Started => {
            entry.state = MachineState::Completed;
            Ok(entry.resolve(outcome))
        }
        MachineState::CanceledAfterInitiated | MachineState::CanceledAfterStarted => {
            entry.state = MachineState::Completed;
            entry.cancel_decision = None;
            Ok(entry.resolve(outcome))
        }
        MachineState::CancellationDecisionSent => {
            entry.state = MachineState::CompletedAfterCancellationDecisionSent;
            Ok(entry.resolve(outcome))
        }
        _ => Err(entry.invalid(event)),
    }
}

pub(crate) fn cancel(entry: &mut MachineEntry) -> Result<CancelEffect, MachineError> {
    match entry.state {
        MachineState::Created => {
            entry.decision = None;
            entry.state = MachineState::Completed;
            let resolution = entry.resolve(MachineOutcome::Canceled {
                details: wl_core::payload::Payloads::new(),
            });
            Ok(CancelEffect::Immediate(resolution))
        }
        MachineState::DecisionSent => {
            entry.state = MachineState::CanceledBeforeInitiated;
            Ok(CancelEffect::Staged(None))
        }
        MachineState::Initiated => {
            entry.state = MachineState::CanceledAfterInitiated;
            entry.cancel_decision = Some(cancel_decision(entry));
            Ok(CancelEffect::Staged(None))
        }
        MachineState::Started => {
            entry.state = MachineState::CanceledAfterStarted;
            entry.cancel_decision = Some(cancel_decision(entry));
            Ok(CancelEffect::Staged(None))
        }
        _ => Ok(CancelEffect::Noop),
    }
}

/// A child's cancellation goes out as an external-workflow cancel keyed by
/// the child's workflow ID.
fn cancel_decision(entry: &MachineEntry) -> Decision {
    Decision::RequestCancelExternalWorkflow {
        cancel_id: entry.id.id.clone(),
        workflow_id: WorkflowId::new(entry.id.id.clone()),
        run_id: None,
    }
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;
