// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! History event types.
//!
//! Every event in an execution's history carries a monotonically increasing
//! `event_id` (from 1), the service-side timestamp, and typed attributes.
//! Serializes with `{"type": "scope:name", ...fields}` format.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wl_core::error::TimeoutKind;
use wl_core::execution::{ActivityId, RunId, TimerId, WorkflowId};
use wl_core::failure::Failure;
use wl_core::payload::Payloads;
use wl_core::retry::RetryState;

/// One entry of an execution's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub event_id: i64,
    pub timestamp_ms: u64,
    #[serde(flatten)]
    pub attrs: EventAttrs,
}

impl HistoryEvent {
    pub fn new(event_id: i64, timestamp_ms: u64, attrs: EventAttrs) -> Self {
        Self { event_id, timestamp_ms, attrs }
    }

    /// Short form for logging: `"5 timer:fired"`.
    pub fn log_summary(&self) -> String {
        format!("{} {}", self.event_id, self.attrs.name())
    }
}

/// Typed attributes of a history event.
///
/// Three families: records of prior decisions being accepted by the service
/// (`*:scheduled`, `timer:started`, ...), external outcomes (`*:completed`,
/// `timer:fired`, ...), and internal synchronization points
/// (`task:started`, `task:completed`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventAttrs {
    // -- execution lifecycle --
    #[serde(rename = "workflow:started")]
    WorkflowStarted {
        workflow_type: String,
        input: Payloads,
        /// Deadline for each workflow task of this execution.
        workflow_task_timeout_ms: u64,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        header: HashMap<String, String>,
    },

    /// Cancellation of the whole execution was requested.
    #[serde(rename = "workflow:cancel_requested")]
    CancelRequested {},

    /// A signal was delivered to the execution.
    #[serde(rename = "workflow:signaled")]
    SignalReceived { signal_name: String, input: Payloads },

    // -- workflow task boundary --
    #[serde(rename = "task:started")]
    WorkflowTaskStarted {},

    #[serde(rename = "task:completed")]
    WorkflowTaskCompleted {},

    // -- timer --
    #[serde(rename = "timer:started")]
    TimerStarted { timer_id: TimerId },

    #[serde(rename = "timer:fired")]
    TimerFired { timer_id: TimerId },

    #[serde(rename = "timer:canceled")]
    TimerCanceled { timer_id: TimerId },

    #[serde(rename = "timer:cancel_failed")]
    CancelTimerFailed { timer_id: TimerId, cause: String },

    // -- activity --
    #[serde(rename = "activity:scheduled")]
    ActivityScheduled { activity_id: ActivityId, activity_type: String },

    #[serde(rename = "activity:started")]
    ActivityStarted { activity_id: ActivityId, identity: String },

    #[serde(rename = "activity:completed")]
    ActivityCompleted { activity_id: ActivityId, result: Payloads },

    #[serde(rename = "activity:failed")]
    ActivityFailed { activity_id: ActivityId, failure: Failure, retry_state: RetryState },

    #[serde(rename = "activity:timed_out")]
    ActivityTimedOut {
        activity_id: ActivityId,
        timeout_kind: TimeoutKind,
        #[serde(default, skip_serializing_if = "Payloads::is_empty")]
        last_heartbeat: Payloads,
        retry_state: RetryState,
    },

    #[serde(rename = "activity:cancel_requested")]
    ActivityCancelRequested { activity_id: ActivityId },

    #[serde(rename = "activity:canceled")]
    ActivityCanceled { activity_id: ActivityId, details: Payloads },

    // -- child workflow --
    #[serde(rename = "child:initiated")]
    ChildWorkflowInitiated { workflow_id: WorkflowId, workflow_type: String },

    #[serde(rename = "child:started")]
    ChildWorkflowStarted { workflow_id: WorkflowId, run_id: RunId },

    #[serde(rename = "child:completed")]
    ChildWorkflowCompleted { workflow_id: WorkflowId, result: Payloads },

    #[serde(rename = "child:failed")]
    ChildWorkflowFailed { workflow_id: WorkflowId, failure: Failure, retry_state: RetryState },

    #[serde(rename = "child:canceled")]
    ChildWorkflowCanceled { workflow_id: WorkflowId, details: Payloads },

    #[serde(rename = "child:timed_out")]
    ChildWorkflowTimedOut {
        workflow_id: WorkflowId,
        timeout_kind: TimeoutKind,
        retry_state: RetryState,
    },

    #[serde(rename = "child:terminated")]
    ChildWorkflowTerminated { workflow_id: WorkflowId },

    // -- external workflow cancellation --
    #[serde(rename = "external_cancel:initiated")]
    ExternalCancelInitiated {
        cancel_id: String,
        workflow_id: WorkflowId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_id: Option<RunId>,
    },

    #[serde(rename = "external_cancel:requested")]
    ExternalCancelRequested { cancel_id: String, workflow_id: WorkflowId },

    #[serde(rename = "external_cancel:failed")]
    ExternalCancelFailed { cancel_id: String, workflow_id: WorkflowId, cause: String },

    // -- external workflow signal --
    #[serde(rename = "external_signal:initiated")]
    ExternalSignalInitiated {
        signal_id: String,
        workflow_id: WorkflowId,
        signal_name: String,
    },

    #[serde(rename = "external_signal:delivered")]
    ExternalSignaled { signal_id: String, workflow_id: WorkflowId },

    #[serde(rename = "external_signal:failed")]
    ExternalSignalFailed { signal_id: String, workflow_id: WorkflowId, cause: String },

    // -- markers and search attributes --
    #[serde(rename = "marker:recorded")]
    MarkerRecorded {
        marker_name: String,
        marker_id: String,
        details: Payloads,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        failure: Option<Failure>,
    },

    #[serde(rename = "search_attrs:upserted")]
    SearchAttributesUpserted { attrs: HashMap<String, serde_json::Value> },
}

impl EventAttrs {
    /// Event name for log spans (e.g. "timer:fired").
    pub fn name(&self) -> &'static str {
        match self {
            EventAttrs::WorkflowStarted { .. } => "workflow:started",
            EventAttrs::CancelRequested {} => "workflow:cancel_requested",
            EventAttrs::SignalReceived { .. } => "workflow:signaled",
            EventAttrs::WorkflowTaskStarted {} => "task:started",
            EventAttrs::WorkflowTaskCompleted {} => "task:completed",
            EventAttrs::TimerStarted { .. } => "timer:started",
            EventAttrs::TimerFired { .. } => "timer:fired",
            EventAttrs::TimerCanceled { .. } => "timer:canceled",
            EventAttrs::CancelTimerFailed { .. } => "timer:cancel_failed",
            EventAttrs::ActivityScheduled { .. } => "activity:scheduled",
            EventAttrs::ActivityStarted { .. } => "activity:started",
            EventAttrs::ActivityCompleted { .. } => "activity:completed",
            EventAttrs::ActivityFailed { .. } => "activity:failed",
            EventAttrs::ActivityTimedOut { .. } => "activity:timed_out",
            EventAttrs::ActivityCancelRequested { .. } => "activity:cancel_requested",
            EventAttrs::ActivityCanceled { .. } => "activity:canceled",
            EventAttrs::ChildWorkflowInitiated { .. } => "child:initiated",
            EventAttrs::ChildWorkflowStarted { .. } => "child:started",
            EventAttrs::ChildWorkflowCompleted { .. } => "child:completed",
            EventAttrs::ChildWorkflowFailed { .. } => "child:failed",
            EventAttrs::ChildWorkflowCanceled { .. } => "child:canceled",
            EventAttrs::ChildWorkflowTimedOut { .. } => "child:timed_out",
            EventAttrs::ChildWorkflowTerminated { .. } => "child:terminated",
            EventAttrs::ExternalCancelInitiated { .. } => "external_cancel:initiated",
            EventAttrs::ExternalCancelRequested { .. } => "external_cancel:requested",
            EventAttrs::ExternalCancelFailed { .. } => "external_cancel:failed",
            EventAttrs::ExternalSignalInitiated { .. } => "external_signal:initiated",
            EventAttrs::ExternalSignaled { .. } => "external_signal:delivered",
            EventAttrs::ExternalSignalFailed { .. } => "external_signal:failed",
            EventAttrs::MarkerRecorded { .. } => "marker:recorded",
            EventAttrs::SearchAttributesUpserted { .. } => "search_attrs:upserted",
        }
    }

    /// True for the two internal synchronization points.
    pub fn is_task_boundary(&self) -> bool {
        matches!(
            self,
            EventAttrs::WorkflowTaskStarted {} | EventAttrs::WorkflowTaskCompleted {}
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
