// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External-workflow cancel and signal machines.
//!
//! Both are fire-and-acknowledge: the decision goes out, the service reports
//! `initiated` (→ `Initiated`), then either delivery or failure closes the
//! machine. They cannot be canceled locally.

use crate::machine::{MachineEntry, MachineError, MachineOutcome, MachineResolution};
use crate::state::MachineState;
use wl_proto::EventAttrs;

pub(crate) fn apply_cancel_machine(
    entry: &mut MachineEntry,
    attrs: &EventAttrs,
) -> Result<Option<MachineResolution>, MachineError> {
    match attrs {
        EventAttrs::ExternalCancelInitiated { .. } => match entry.state {
            MachineState::DecisionSent => {
                entry.state = MachineState::Initiated;
                Ok(None)
            }
            _ => Err(entry.invalid("external_cancel:initiated")),
        },
        EventAttrs::ExternalCancelRequested { .. } => match entry.state {
            MachineState::Initiated => {
                entry.state = MachineState::Completed;
                Ok(entry.resolve(MachineOutcome::Delivered))
            }
            _ => Err(entry.invalid("external_cancel:requested")),
        },
        EventAttrs::ExternalCancelFailed { cause, .. } => match entry.state {
            MachineState::Initiated => {
                entry.state = MachineState::Completed;
                Ok(entry.resolve(MachineOutcome::DeliveryFailed { cause: cause.clone() }))
            }
            _ => Err(entry.invalid("external_cancel:failed")),
        },
        _ => Err(entry.invalid("unexpected event kind")),
    }
}

pub(crate) fn apply_signal_machine(
    entry: &mut MachineEntry,
    attrs: &EventAttrs,
) -> Result<Option<MachineResolution>, MachineError> {
    match attrs {
        EventAttrs::ExternalSignalInitiated { .. } => match entry.state {
            MachineState::DecisionSent => {
                entry.state = MachineState::Initiated;
                Ok(None)
            }
            _ => Err(entry.invalid("external_signal:initiated")),
        },
        EventAttrs::ExternalSignaled { .. } => match entry.state {
            MachineState::Initiated => {
                entry.state = MachineState::Completed;
                Ok(entry.resolve(MachineOutcome::Delivered))
            }
            _ => Err(entry.invalid("external_signal:delivered")),
        },
        EventAttrs::ExternalSignalFailed { cause, .. } => match entry.state {
            MachineState::Initiated => {
                entry.state = MachineState::Completed;
                Ok(entry.resolve(MachineOutcome::DeliveryFailed { cause: cause.clone() }))
            }
            _ => Err(entry.invalid("external_signal:failed")),
        },
        _ => Err(entry.invalid("unexpected event kind")),
    }
}

#[cfg(test)]
#[path = "external_tests.rs"]
mod tests;
