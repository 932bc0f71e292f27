// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The machine registry: every outstanding action of one workflow execution.
//!
//! Entries live in an insertion-ordered map, so flushed decisions preserve
//! creation order. The one ordering exception: record-marker decisions for
//! local-activity results are hoisted ahead of any cancellation decision in
//! the same batch, so replay sees the result before the cancel it caused.

use crate::machine::{
    CancelEffect, MachineEntry, MachineError, MachineId, MachineKind, MachineResolution,
    WakeHandle,
};
use crate::state::MachineState;
use crate::{activity, child, external, marker, timer};
use indexmap::IndexMap;
use wl_core::execution::{ActivityId, TimerId, WorkflowId};
use wl_proto::{Decision, EventAttrs, HistoryEvent};

#[derive(Default)]
pub struct MachineRegistry {
    entries: IndexMap<MachineId, MachineEntry>,
    /// Workflow-closing decision; emitted last, exactly once.
    terminal_decision: Option<Decision>,
    terminal_recorded: bool,
}

impl MachineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- local intents -------------------------------------------------

    pub fn start_timer(
        &mut self,
        timer_id: TimerId,
        fire_after_ms: u64,
        handle: Option<WakeHandle>,
    ) -> Result<(), MachineError> {
        let decision = Decision::StartTimer { timer_id: timer_id.clone(), fire_after_ms };
        self.insert(MachineId::timer(timer_id.as_str()), decision, handle)
    }

    pub fn cancel_timer(
        &mut self,
        timer_id: &TimerId,
    ) -> Result<Option<MachineResolution>, MachineError> {
        let entry = self.entry_mut(&MachineId::timer(timer_id.as_str()))?;
        Ok(flatten_cancel(timer::cancel(entry)?))
    }

    pub fn schedule_activity(
        &mut self,
        activity_id: ActivityId,
        decision: Decision,
        handle: Option<WakeHandle>,
    ) -> Result<(), MachineError> {
        self.insert(MachineId::activity(activity_id.as_str()), decision, handle)
    }

    pub fn request_cancel_activity(
        &mut self,
        activity_id: &ActivityId,
    ) -> Result<Option<MachineResolution>, MachineError> {
        let entry = self.entry_mut(&MachineId::activity(activity_id.as_str()))?;
        Ok(flatten_cancel(activity::cancel(entry)?))
    }

    pub fn start_child_workflow(
        &mut self,
        workflow_id: WorkflowId,
        decision: Decision,
        handle: Option<WakeHandle>,
    ) -> Result<(), MachineError> {
        self.insert(MachineId::child(workflow_id.as_str()), decision, handle)
    }

    pub fn request_cancel_child(
        &mut self,
        workflow_id: &WorkflowId,
    ) -> Result<Option<MachineResolution>, MachineError> {
        let entry = self.entry_mut(&MachineId::child(workflow_id.as_str()))?;
        Ok(flatten_cancel(child::cancel(entry)?))
    }

    /// Cancel an arbitrary external workflow (not a child of this one).
    pub fn request_cancel_external(
        &mut self,
        cancel_id: impl Into<String>,
        decision: Decision,
        handle: Option<WakeHandle>,
    ) -> Result<(), MachineError> {
        self.insert(MachineId::new(MachineKind::ExternalCancel, cancel_id), decision, handle)
    }

    pub fn signal_external(
        &mut self,
        signal_id: impl Into<String>,
        decision: Decision,
        handle: Option<WakeHandle>,
    ) -> Result<(), MachineError> {
        self.insert(MachineId::new(MachineKind::ExternalSignal, signal_id), decision, handle)
    }

    pub fn record_marker(
        &mut self,
        marker_id: impl Into<String>,
        decision: Decision,
    ) -> Result<(), MachineError> {
        self.insert(MachineId::new(MachineKind::Marker, marker_id), decision, None)
    }

    pub fn upsert_search_attributes(
        &mut self,
        upsert_id: impl Into<String>,
        decision: Decision,
    ) -> Result<(), MachineError> {
        self.insert(MachineId::new(MachineKind::SearchAttributes, upsert_id), decision, None)
    }

    /// Record the workflow-closing decision. The first one wins; anything a
    /// coroutine produces after the workflow completed is dropped.
    pub fn set_terminal_decision(&mut self, decision: Decision) {
        if self.terminal_recorded {
            tracing::warn!(decision = decision.name(), "workflow already closed, dropping");
            return;
        }
        self.terminal_recorded = true;
        self.terminal_decision = Some(decision);
    }

    pub fn workflow_closed(&self) -> bool {
        self.terminal_recorded
    }

    // ---- remote events -------------------------------------------------

    /// Route a history event to its machine.
    ///
    /// Returns resolutions for any user-code futures this event completed.
    /// Events that do not target a machine (task boundaries, signals,
    /// workflow-level attributes) resolve to an empty list.
    pub fn handle_event(
        &mut self,
        event: &HistoryEvent,
    ) -> Result<Vec<MachineResolution>, MachineError> {
        let attrs = &event.attrs;
        let resolution = match attrs {
            EventAttrs::TimerStarted { timer_id }
            | EventAttrs::TimerFired { timer_id }
            | EventAttrs::TimerCanceled { timer_id }
            | EventAttrs::CancelTimerFailed { timer_id, .. } => {
                let entry = self.entry_mut(&MachineId::timer(timer_id.as_str()))?;
                timer::apply(entry, attrs)?
            }
            EventAttrs::ActivityScheduled { activity_id, .. }
            | EventAttrs::ActivityStarted { activity_id, .. }
            | EventAttrs::ActivityCompleted { activity_id, .. }
            | EventAttrs::ActivityFailed { activity_id, .. }
            | EventAttrs::ActivityTimedOut { activity_id, .. }
            | EventAttrs::ActivityCancelRequested { activity_id }
            | EventAttrs::ActivityCanceled { activity_id, .. } => {
                let entry = self.entry_mut(&MachineId::activity(activity_id.as_str()))?;
                activity::apply(entry, attrs)?
            }
            EventAttrs::ChildWorkflowInitiated { workflow_id, .. }
            | EventAttrs::ChildWorkflowStarted { workflow_id, .. }
            | EventAttrs::ChildWorkflowCompleted { workflow_id, .. }
            | EventAttrs::ChildWorkflowFailed { workflow_id, .. }
            | EventAttrs::ChildWorkflowCanceled { workflow_id, .. }
            | EventAttrs::ChildWorkflowTimedOut { workflow_id, .. }
            | EventAttrs::ChildWorkflowTerminated { workflow_id } => {
                let entry = self.entry_mut(&MachineId::child(workflow_id.as_str()))?;
                child::apply(entry, attrs)?
            }
            EventAttrs::ExternalCancelInitiated { cancel_id, workflow_id, .. }
            | EventAttrs::ExternalCancelRequested { cancel_id, workflow_id }
            | EventAttrs::ExternalCancelFailed { cancel_id, workflow_id, .. } => {
                // Prefer a dedicated external-cancel machine; otherwise this
                // is progress on a child cancellation.
                let external_id = MachineId::new(MachineKind::ExternalCancel, cancel_id.clone());
                if self.entries.contains_key(&external_id) {
                    let entry = self.entry_mut(&external_id)?;
                    external::apply_cancel_machine(entry, attrs)?
                } else {
                    let entry = self.entry_mut(&MachineId::child(workflow_id.as_str()))?;
                    child::apply(entry, attrs)?
                }
            }
            EventAttrs::ExternalSignalInitiated { signal_id, .. }
            | EventAttrs::ExternalSignaled { signal_id, .. }
            | EventAttrs::ExternalSignalFailed { signal_id, .. } => {
                let entry =
                    self.entry_mut(&MachineId::new(MachineKind::ExternalSignal, signal_id.clone()))?;
                external::apply_signal_machine(entry, attrs)?
            }
            EventAttrs::MarkerRecorded { marker_id, .. } => {
                // Markers replay ahead of the code that records them; with no
                // machine yet, the engine's marker stash owns the event.
                let id = MachineId::new(MachineKind::Marker, marker_id.clone());
                if self.entries.contains_key(&id) {
                    let entry = self.entry_mut(&id)?;
                    marker::apply(entry, attrs)?
                } else {
                    None
                }
            }
            // Search-attribute machines are degenerate; the context overlay
            // is applied by the engine and needs no machine transition.
            EventAttrs::SearchAttributesUpserted { .. } => None,
            // Workflow-level events are the engine's concern.
            _ => None,
        };
        Ok(resolution.into_iter().collect())
    }

    // ---- flush ---------------------------------------------------------

    /// Drain all pending decisions in creation order.
    ///
    /// Side effect of the flush: `Created` entries move to `DecisionSent`
    /// (degenerate kinds complete), staged cancellations move to
    /// `CancellationDecisionSent`. Re-running the flush never re-emits.
    pub fn take_decisions(&mut self) -> Vec<Decision> {
        let mut batch = Vec::new();
        for entry in self.entries.values_mut() {
            entry.flush_into(&mut batch);
        }

        // Hoist local-activity markers ahead of the first cancellation so a
        // marker/cancel pair synthesized from one result replays in order.
        if let Some(first_cancel) = batch.iter().position(|d| d.is_cancellation()) {
            let tail: Vec<Decision> = batch.split_off(first_cancel);
            let (markers, rest): (Vec<Decision>, Vec<Decision>) =
                tail.into_iter().partition(|d| d.is_local_activity_marker());
            batch.extend(markers);
            batch.extend(rest);
        }

        if let Some(terminal) = self.terminal_decision.take() {
            batch.push(terminal);
        }

        if !batch.is_empty() {
            tracing::debug!(count = batch.len(), "flushed decisions");
        }
        batch
    }

    /// Whether any entry or terminal decision is waiting for a flush.
    pub fn has_pending_decisions(&self) -> bool {
        self.terminal_decision.is_some()
            || self.entries.values().any(|e| {
                matches!(e.state, MachineState::Created)
                    || (e.state.has_staged_cancel() && e.cancel_decision.is_some())
            })
    }

    // ---- introspection -------------------------------------------------

    pub fn state_of(&self, id: &MachineId) -> Option<MachineState> {
        self.entries.get(id).map(|e| e.state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every machine reached a terminal state.
    pub fn all_terminal(&self) -> bool {
        self.entries.values().all(|e| e.state.is_terminal())
    }

    // ---- internals -----------------------------------------------------

    fn insert(
        &mut self,
        id: MachineId,
        decision: Decision,
        handle: Option<WakeHandle>,
    ) -> Result<(), MachineError> {
        if self.entries.contains_key(&id) {
            return Err(MachineError::Duplicate(id));
        }
        tracing::trace!(machine = %id, "machine created");
        self.entries.insert(id.clone(), MachineEntry::new(id, decision, handle));
        Ok(())
    }

    fn entry_mut(&mut self, id: &MachineId) -> Result<&mut MachineEntry, MachineError> {
        self.entries.get_mut(id).ok_or_else(|| MachineError::NotFound(id.clone()))
    }
}

fn flatten_cancel(effect: CancelEffect) -> Option<MachineResolution> {
    match effect {
        CancelEffect::Immediate(resolution) | CancelEffect::Staged(resolution) => resolution,
        CancelEffect::Noop => None,
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "property_tests.rs"]
mod property_tests;
