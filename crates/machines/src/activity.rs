// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity machine transitions.
//!
//! Unlike timers, an activity cancel is only a request: once the schedule
//! decision has been externalized, the waiting future resolves from whatever
//! terminal event the service reports. A completion that races the
//! cancellation wins, and user code observes the success result.

use crate::machine::{CancelEffect, MachineEntry, MachineError, MachineOutcome, MachineResolution};
use crate::state::MachineState;
use wl_core::execution::ActivityId;
use wl_proto::{Decision, EventAttrs};

pub(crate) fn apply(
    entry: &mut MachineEntry,
    attrs: &EventAttrs,
) -> Result<Option<MachineResolution>, MachineError> {
    match attrs {
        EventAttrs::ActivityScheduled { .. } => match entry.state {
            MachineState::DecisionSent => {
                entry.state = MachineState::Initiated;
                Ok(None)
            }
            MachineState::CanceledBeforeInitiated => {
                entry.state = MachineState::CanceledAfterInitiated;
                entry.cancel_decision = Some(Decision::RequestCancelActivity {
                    activity_id: ActivityId::new(entry.id.id.clone()),
                });
                Ok(None)
            }
            _ => Err(entry.invalid("activity:scheduled")),
        },
        EventAttrs::ActivityStarted { .. } => match entry.state {
            MachineState::Initiated => {
                entry.state = MachineState::Started;
                Ok(None)
            }
            MachineState::CanceledAfterInitiated => {
                entry.state = MachineState::CanceledAfterStarted;
                Ok(None)
            }
            // Started while our cancellation request is in flight.
            MachineState::CancellationDecisionSent => Ok(None),
            _ => Err(entry.invalid("activity:started")),
        },
        EventAttrs::ActivityCompleted { result, .. } => {
            terminal(entry, "activity:completed", MachineOutcome::Completed { result: result.clone() })
        }
        EventAttrs::ActivityFailed { failure, retry_state, .. } => terminal(
            entry,
            "activity:failed",
            MachineOutcome::Failed { failure: failure.clone(), retry_state: *retry_state },
        ),
        EventAttrs::ActivityTimedOut { timeout_kind, last_heartbeat, retry_state, .. } => terminal(
            entry,
            "activity:timed_out",
            MachineOutcome::TimedOut {
                kind: *timeout_kind,
                last_heartbeat: last_heartbeat.clone(),
                retry_state: *retry_state,
            },
        ),
        EventAttrs::ActivityCancelRequested { .. } => match entry.state {
            // Service acknowledged our cancellation request.
            MachineState::CancellationDecisionSent => Ok(None),
            _ => Err(entry.invalid("activity:cancel_requested")),
        },
        EventAttrs::ActivityCanceled { details, .. } => match entry.state {
            MachineState::CancellationDecisionSent => {
                entry.state = MachineState::Completed;
                Ok(entry.resolve(MachineOutcome::Canceled { details: details.clone() }))
            }
            _ => Err(entry.invalid("activity:canceled")),
        },
        _ => Err(entry.invalid("unexpected event kind")),
    }
}

/// Handle a non-cancellation terminal event in every state it can legally
/// arrive in.
fn terminal(
    entry: &mut MachineEntry,
    event: &'static str,
    outcome: MachineOutcome,
) -> Result<Option<MachineResolution>, MachineError> {
    match entry.state {
        // Completion without a started event is legal: history may compress
        // short activities into schedule → complete.
        MachineState::Initiated | MachineState::Started => {
            entry.state = MachineState::Completed;
            Ok(entry.resolve(outcome))
        }
        // Outcome beat a staged (not yet sent) cancellation; drop the cancel.
        MachineState::CanceledAfterInitiated | MachineState::CanceledAfterStarted => {
            entry.state = MachineState::Completed;
            entry.cancel_decision = None;
            Ok(entry.resolve(outcome))
        }
        // Outcome beat the sent cancellation; user code observes the
        // real result, not a cancellation.
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
            entry.cancel_decision = Some(Decision::RequestCancelActivity {
                activity_id: ActivityId::new(entry.id.id.clone()),
            });
            Ok(CancelEffect::Staged(None))
        }
        MachineState::Started => {
            entry.state = MachineState::CanceledAfterStarted;
            entry.cancel_decision = Some(Decision::RequestCancelActivity {
                activity_id: ActivityId::new(entry.id.id.clone()),
            });
            Ok(CancelEffect::Staged(None))
        }
        _ => Ok(CancelEffect::Noop),
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
