// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machine identity, entries, and the resolution types machines hand back
//! to the replay engine.

use crate::state::MachineState;
use thiserror::Error;
use wl_core::error::TimeoutKind;
use wl_core::failure::Failure;
use wl_core::payload::Payloads;
use wl_core::retry::RetryState;
use wl_proto::Decision;

/// Which transition table an entry follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineKind {
    Timer,
    Activity,
    ChildWorkflow,
    ExternalCancel,
    ExternalSignal,
    Marker,
    SearchAttributes,
}

wl_core::simple_display! {
    MachineKind {
        Timer => "timer",
        Activity => "activity",
        ChildWorkflow => "child",
        ExternalCancel => "external_cancel",
        ExternalSignal => "external_signal",
        Marker => "marker",
        SearchAttributes => "search_attrs",
    }
}

/// Registry key: machine kind plus the correlation ID unique within the
/// workflow (activity ID, timer ID, or a generated sequence number).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineId {
    pub kind: MachineKind,
    pub id: String,
}

impl MachineId {
    pub fn new(kind: MachineKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn timer(id: impl Into<String>) -> Self {
        Self::new(MachineKind::Timer, id)
    }

    pub fn activity(id: impl Into<String>) -> Self {
        Self::new(MachineKind::Activity, id)
    }

    pub fn child(id: impl Into<String>) -> Self {
        Self::new(MachineKind::ChildWorkflow, id)
    }
}

impl std::fmt::Display for MachineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Integer handle to the user-code future a machine will complete.
///
/// Handles index an arena owned by the workflow context; machines never hold
/// owning references to futures, which keeps the machine/future graph
/// acyclic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakeHandle(pub u64);

/// What a machine resolved to, in wire terms.
///
/// The engine owns the mapping to user-visible errors; machines only relay
/// what the history said.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineOutcome {
    /// Timer fired.
    Fired,
    /// Action produced a result.
    Completed { result: Payloads },
    /// Action failed.
    Failed { failure: Failure, retry_state: RetryState },
    /// Action timed out.
    TimedOut { kind: TimeoutKind, last_heartbeat: Payloads, retry_state: RetryState },
    /// Action was canceled.
    Canceled { details: Payloads },
    /// Child workflow was terminated from outside.
    Terminated,
    /// External cancel/signal was delivered.
    Delivered,
    /// External cancel/signal could not be delivered.
    DeliveryFailed { cause: String },
}

/// A completed future hand-off: which handle to settle, with what.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineResolution {
    pub machine: MachineId,
    pub handle: WakeHandle,
    pub outcome: MachineOutcome,
}

/// Fatal bookkeeping errors.
///
/// Every variant means the worker's view of history has diverged from the
/// service's; the current workflow task must be failed so the service
/// redelivers it for a clean replay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    #[error("machine already exists: {0}")]
    Duplicate(MachineId),
    #[error("machine not found: {0}")]
    NotFound(MachineId),
    #[error("invalid transition for {id}: {event} in state {state}")]
    InvalidTransition { id: MachineId, state: MachineState, event: &'static str },
}

/// Effect of a local cancel intent.
#[derive(Debug)]
pub enum CancelEffect {
    /// The intent was never externalized; the machine completed without
    /// emitting anything. Carries the resolution for the waiting future.
    Immediate(Option<MachineResolution>),
    /// A cancellation decision was staged for the next flush. Any resolution
    /// carried here is delivered now (timers resolve at cancel time).
    Staged(Option<MachineResolution>),
    /// Machine was already canceled or terminal.
    Noop,
}

/// One outstanding action: correlation ID, state, staged decisions, and the
/// handle of the future to resolve.
#[derive(Debug)]
pub struct MachineEntry {
    pub id: MachineId,
    pub state: MachineState,
    /// Primary decision; consumed by the flush that sends it, so a retried
    /// flush never re-emits it.
    pub(crate) decision: Option<Decision>,
    /// Cancellation decision staged by a cancel-after-acknowledge path.
    pub(crate) cancel_decision: Option<Decision>,
    pub(crate) handle: Option<WakeHandle>,
    /// Set once the waiting future has been resolved; later terminal events
    /// must not resolve it twice.
    pub(crate) resolved: bool,
}

impl MachineEntry {
    pub(crate) fn new(id: MachineId, decision: Decision, handle: Option<WakeHandle>) -> Self {
        Self {
            id,
            state: MachineState::Created,
            decision: Some(decision),
            cancel_decision: None,
            handle,
            resolved: false,
        }
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Build a resolution for this entry's future, once.
    pub(crate) fn resolve(&mut self, outcome: MachineOutcome) -> Option<MachineResolution> {
        if self.resolved {
            return None;
        }
        let handle = self.handle?;
        self.resolved = true;
        Some(MachineResolution { machine: self.id.clone(), handle, outcome })
    }

    pub(crate) fn invalid(&self, event: &'static str) -> MachineError {
        MachineError::InvalidTransition { id: self.id.clone(), state: self.state, event }
    }

    /// Move decisions staged on this entry into `out` (flush side effect).
    ///
    /// `Created` entries transition to `DecisionSent` (degenerate marker-like
    /// kinds go straight to `Completed`); staged cancellations transition to
    /// `CancellationDecisionSent`.
    pub(crate) fn flush_into(&mut self, out: &mut Vec<Decision>) {
        match self.state {
            MachineState::Created => {
                if let Some(decision) = self.decision.take() {
                    out.push(decision);
                }
                self.state = match self.id.kind {
                    MachineKind::Marker | MachineKind::SearchAttributes => MachineState::Completed,
                    _ => MachineState::DecisionSent,
                };
            }
            MachineState::CanceledAfterInitiated | MachineState::CanceledAfterStarted => {
                if let Some(decision) = self.cancel_decision.take() {
                    out.push(decision);
                    self.state = MachineState::CancellationDecisionSent;
                }
            }
            _ => {}
        }
    }
}
