// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared machine state enum.
//!
//! All machine kinds move through the same state set; which transitions are
//! legal differs per kind. The DAG has exactly two sinks: `Completed` and
//! `CompletedAfterCancellationDecisionSent`.

use serde::{Deserialize, Serialize};

/// Lifecycle state of one decision machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineState {
    /// Intent recorded locally; decision not yet handed to the poller.
    Created,
    /// Decision included in an outgoing batch.
    DecisionSent,
    /// Canceled while still `Created`; the intent was never externalized.
    CanceledBeforeSent,
    /// Canceled after the decision went out but before the service
    /// acknowledged it.
    CanceledBeforeInitiated,
    /// Service acknowledged the decision (scheduled / started the timer /
    /// initiated the child).
    Initiated,
    /// The action began executing (activity picked up, child running).
    Started,
    /// Cancel requested after the service acknowledged; a cancellation
    /// decision is staged for the next flush.
    CanceledAfterInitiated,
    /// Cancel requested after the action started executing.
    CanceledAfterStarted,
    /// The cancellation decision is in an outgoing batch.
    CancellationDecisionSent,
    /// Terminal: the action produced a non-cancellation outcome after the
    /// cancellation decision had already been sent.
    CompletedAfterCancellationDecisionSent,
    /// Terminal.
    Completed,
}

wl_core::simple_display! {
    MachineState {
        Created => "created",
        DecisionSent => "decision_sent",
        CanceledBeforeSent => "canceled_before_sent",
        CanceledBeforeInitiated => "canceled_before_initiated",
        Initiated => "initiated",
        Started => "started",
        CanceledAfterInitiated => "canceled_after_initiated",
        CanceledAfterStarted => "canceled_after_started",
        CancellationDecisionSent => "cancellation_decision_sent",
        CompletedAfterCancellationDecisionSent => "completed_after_cancellation_decision_sent",
        Completed => "completed",
    }
}

impl MachineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MachineState::Completed | MachineState::CompletedAfterCancellationDecisionSent
        )
    }

    /// States in which a locally staged cancellation decision is waiting for
    /// the next flush.
    pub fn has_staged_cancel(&self) -> bool {
        matches!(
            self,
            MachineState::CanceledAfterInitiated | MachineState::CanceledAfterStarted
        )
    }
}
