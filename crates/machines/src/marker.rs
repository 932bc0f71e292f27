// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Marker and search-attribute machines.
//!
//! Both are degenerate: `Created → (flush) → Completed`. The flush itself is
//! the whole lifecycle; the service's confirming events carry no state the
//! machine still needs, so a replayed `marker:recorded` against an existing
//! machine just confirms completion.

use crate::machine::{MachineEntry, MachineError, MachineResolution};
use crate::state::MachineState;
use wl_proto::EventAttrs;

pub(crate) fn apply(
    entry: &mut MachineEntry,
    attrs: &EventAttrs,
) -> Result<Option<MachineResolution>, MachineError> {
    match attrs {
        EventAttrs::MarkerRecorded { .. } => match entry.state {
            // Replay confirmation; flush already completed the machine.
            MachineState::Completed => Ok(None),
            // Confirmation arriving before this turn's flush (history
            // replay feeds events first).
            MachineState::Created | MachineState::DecisionSent => {
                entry.decision = None;
                entry.state = MachineState::Completed;
                Ok(None)
            }
            _ => Err(entry.invalid("marker:recorded")),
        },
        EventAttrs::SearchAttributesUpserted { .. } => match entry.state {
            MachineState::Completed => Ok(None),
            MachineState::Created | MachineState::DecisionSent => {
                entry.decision = None;
                entry.state = MachineState::Completed;
                Ok(None)
            }
            _ => Err(entry.invalid("search_attrs:upserted")),
        },
        _ => Err(entry.invalid("unexpected event kind")),
    }
}
