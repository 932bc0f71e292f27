// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer machine transitions.
//!
//! Timers have no `Started` stage; the service acknowledges `timer:start`
//! with `timer:started` (→ `Initiated`) and later reports `timer:fired` or
//! `timer:canceled`. Cancelling a timer resolves the waiting future at
//! cancel time; the machine then runs to its terminal on its own.

use crate::machine::{CancelEffect, MachineEntry, MachineError, MachineOutcome, MachineResolution};
use crate::state::MachineState;
use wl_proto::{Decision, EventAttrs};

pub(crate) fn apply(
    entry: &mut MachineEntry,
    attrs: &EventAttrs,
) -> Result<Option<MachineResolution>, MachineError> {
    match attrs {
        EventAttrs::TimerStarted { .. } => match entry.state {
            MachineState::DecisionSent => {
                entry.state = MachineState::Initiated;
                Ok(None)
            }
            MachineState::CanceledBeforeInitiated => {
                // The start raced our cancel; externalize the cancellation.
                entry.state = MachineState::CanceledAfterInitiated;
                entry.cancel_decision = Some(Decision::CancelTimer {
                    timer_id: timer_id_of(entry)?,
                });
                Ok(None)
            }
            _ => Err(entry.invalid("timer:started")),
        },
        EventAttrs::TimerFired { .. } => match entry.state {
            MachineState::Initiated => {
                entry.state = MachineState::Completed;
                Ok(entry.resolve(MachineOutcome::Fired))
            }
            // Fired before the staged cancellation ever went out: drop it.
            MachineState::CanceledAfterInitiated => {
                entry.state = MachineState::Completed;
                entry.cancel_decision = None;
                Ok(entry.resolve(MachineOutcome::Fired))
            }
            // Fired despite a sent cancellation; the cancel lost the race.
            MachineState::CancellationDecisionSent => {
                entry.state = MachineState::CompletedAfterCancellationDecisionSent;
                Ok(entry.resolve(MachineOutcome::Fired))
            }
            _ => Err(entry.invalid("timer:fired")),
        },
        EventAttrs::TimerCanceled { .. } => match entry.state {
            MachineState::CancellationDecisionSent => {
                entry.state = MachineState::Completed;
                Ok(entry.resolve(MachineOutcome::Canceled {
                    details: wl_core::payload::Payloads::new(),
                }))
            }
            _ => Err(entry.invalid("timer:canceled")),
        },
        EventAttrs::CancelTimerFailed { .. } => match entry.state {
            // The cancel could not be honored; the timer will fire. Treat the
            // cancellation attempt as finished and let timer:fired close the
            // machine.
            MachineState::CancellationDecisionSent => Ok(None),
            _ => Err(entry.invalid("timer:cancel_failed")),
        },
        _ => Err(entry.invalid("unexpected event kind")),
    }
}

pub(crate) fn cancel(entry: &mut MachineEntry) -> Result<CancelEffect, MachineError> {
    let canceled = MachineOutcome::Canceled { details: wl_core::payload::Payloads::new() };
    match entry.state {
        MachineState::Created => {
            // Never externalized: complete silently, zero decisions.
            entry.decision = None;
            entry.state = MachineState::Completed;
            Ok(CancelEffect::Immediate(entry.resolve(canceled)))
        }
        MachineState::DecisionSent => {
            entry.state = MachineState::CanceledBeforeInitiated;
            Ok(CancelEffect::Staged(entry.resolve(canceled)))
        }
        MachineState::Initiated => {
            entry.state = MachineState::CanceledAfterInitiated;
            entry.cancel_decision = Some(Decision::CancelTimer {
                timer_id: timer_id_of(entry)?,
            });
            Ok(CancelEffect::Staged(entry.resolve(canceled)))
        }
        // Cancel of an already-canceled or finished timer is a no-op.
        _ => Ok(CancelEffect::Noop),
    }
}

fn timer_id_of(entry: &MachineEntry) -> Result<wl_core::execution::TimerId, MachineError> {
    Ok(wl_core::execution::TimerId::new(entry.id.id.clone()))
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
