// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! History traversal helpers.

use crate::event::{EventAttrs, HistoryEvent};

/// A view over a task's history delta.
///
/// Events at or below `previous_started_event_id` were already processed in
/// an earlier decision turn; replaying them must not change observable
/// behavior. Everything above is new input for the current turn(s).
#[derive(Debug, Clone)]
pub struct HistoryWindow<'a> {
    events: &'a [HistoryEvent],
    previous_started_event_id: i64,
}

impl<'a> HistoryWindow<'a> {
    pub fn new(events: &'a [HistoryEvent], previous_started_event_id: i64) -> Self {
        Self { events, previous_started_event_id }
    }

    pub fn events(&self) -> &'a [HistoryEvent] {
        self.events
    }

    /// Whether the given event belongs to an already-processed turn.
    pub fn is_replay(&self, event: &HistoryEvent) -> bool {
        event.event_id <= self.previous_started_event_id
    }

    /// Event ID of the last `task:started` event, or 0 when there is none.
    pub fn last_started_event_id(&self) -> i64 {
        self.events
            .iter()
            .rev()
            .find(|e| matches!(e.attrs, EventAttrs::WorkflowTaskStarted {}))
            .map(|e| e.event_id)
            .unwrap_or(0)
    }

    /// Number of decision turns (started boundaries) in the window.
    pub fn turn_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.attrs, EventAttrs::WorkflowTaskStarted {}))
            .count()
    }
}
