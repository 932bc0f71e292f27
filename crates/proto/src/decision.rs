// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decisions: outgoing intents produced during replay.
//!
//! Each decision carries a correlation ID unique within the workflow (an
//! activity ID, timer ID, or generated sequence number). The service answers
//! each decision with one or more history events referencing that ID.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wl_core::execution::{ActivityId, RunId, TimerId, WorkflowId};
use wl_core::failure::Failure;
use wl_core::payload::Payloads;
use wl_core::retry::RetryPolicy;

/// Marker name used for memoized side-effect results.
pub const MARKER_SIDE_EFFECT: &str = "side_effect";
/// Marker name used for mutable side-effect results.
pub const MARKER_MUTABLE_SIDE_EFFECT: &str = "mutable_side_effect";
/// Marker name used for version (patch) records.
pub const MARKER_VERSION: &str = "version";
/// Marker name used for local activity results.
pub const MARKER_LOCAL_ACTIVITY: &str = "local_activity";

/// An outgoing intent to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Decision {
    #[serde(rename = "timer:start")]
    StartTimer { timer_id: TimerId, fire_after_ms: u64 },

    #[serde(rename = "timer:cancel")]
    CancelTimer { timer_id: TimerId },

    #[serde(rename = "activity:schedule")]
    ScheduleActivity {
        activity_id: ActivityId,
        activity_type: String,
        task_list: String,
        input: Payloads,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schedule_to_close_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schedule_to_start_ms: Option<u64>,
        start_to_close_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heartbeat_timeout_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry_policy: Option<RetryPolicy>,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        header: HashMap<String, String>,
    },

    #[serde(rename = "activity:request_cancel")]
    RequestCancelActivity { activity_id: ActivityId },

    #[serde(rename = "child:start")]
    StartChildWorkflow {
        workflow_id: WorkflowId,
        workflow_type: String,
        task_list: String,
        input: Payloads,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_timeout_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry_policy: Option<RetryPolicy>,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        header: HashMap<String, String>,
    },

    #[serde(rename = "external:request_cancel")]
    RequestCancelExternalWorkflow {
        cancel_id: String,
        workflow_id: WorkflowId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_id: Option<RunId>,
    },

    #[serde(rename = "external:signal")]
    SignalExternalWorkflow {
        signal_id: String,
        workflow_id: WorkflowId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_id: Option<RunId>,
        signal_name: String,
        input: Payloads,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        header: HashMap<String, String>,
    },

    #[serde(rename = "marker:record")]
    RecordMarker {
        marker_name: String,
        marker_id: String,
        details: Payloads,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        failure: Option<Failure>,
    },

    #[serde(rename = "search_attrs:upsert")]
    UpsertSearchAttributes { attrs: HashMap<String, serde_json::Value> },

    #[serde(rename = "workflow:complete")]
    CompleteWorkflow { result: Payloads },

    #[serde(rename = "workflow:fail")]
    FailWorkflow { failure: Failure },

    #[serde(rename = "workflow:cancel")]
    CancelWorkflow { details: Payloads },

    #[serde(rename = "workflow:continue_as_new")]
    ContinueAsNew {
        workflow_type: String,
        input: Payloads,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_list: Option<String>,
    },
}

impl Decision {
    /// Decision name for log spans (e.g. "timer:start").
    pub fn name(&self) -> &'static str {
        match self {
            Decision::StartTimer { .. } => "timer:start",
            Decision::CancelTimer { .. } => "timer:cancel",
            Decision::ScheduleActivity { .. } => "activity:schedule",
            Decision::RequestCancelActivity { .. } => "activity:request_cancel",
            Decision::StartChildWorkflow { .. } => "child:start",
            Decision::RequestCancelExternalWorkflow { .. } => "external:request_cancel",
            Decision::SignalExternalWorkflow { .. } => "external:signal",
            Decision::RecordMarker { .. } => "marker:record",
            Decision::UpsertSearchAttributes { .. } => "search_attrs:upsert",
            Decision::CompleteWorkflow { .. } => "workflow:complete",
            Decision::FailWorkflow { .. } => "workflow:fail",
            Decision::CancelWorkflow { .. } => "workflow:cancel",
            Decision::ContinueAsNew { .. } => "workflow:continue_as_new",
        }
    }

    /// True for the three decisions that cancel an in-flight action.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Decision::CancelTimer { .. }
                | Decision::RequestCancelActivity { .. }
                | Decision::RequestCancelExternalWorkflow { .. }
        )
    }

    /// True for markers recording a local activity result.
    pub fn is_local_activity_marker(&self) -> bool {
        matches!(self, Decision::RecordMarker { marker_name, .. } if marker_name == MARKER_LOCAL_ACTIVITY)
    }

    /// True for decisions that close the workflow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Decision::CompleteWorkflow { .. }
                | Decision::FailWorkflow { .. }
                | Decision::CancelWorkflow { .. }
                | Decision::ContinueAsNew { .. }
        )
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Decision::StartTimer { timer_id, fire_after_ms } => vec![
                ("timer_id", timer_id.to_string()),
                ("fire_after_ms", fire_after_ms.to_string()),
            ],
            Decision::CancelTimer { timer_id } => vec![("timer_id", timer_id.to_string())],
            Decision::ScheduleActivity { activity_id, activity_type, task_list, .. } => vec![
                ("activity_id", activity_id.to_string()),
                ("activity_type", activity_type.clone()),
                ("task_list", task_list.clone()),
            ],
            Decision::RequestCancelActivity { activity_id } => {
                vec![("activity_id", activity_id.to_string())]
            }
            Decision::StartChildWorkflow { workflow_id, workflow_type, .. } => vec![
                ("workflow_id", workflow_id.to_string()),
                ("workflow_type", workflow_type.clone()),
            ],
            Decision::RequestCancelExternalWorkflow { cancel_id, workflow_id, .. } => vec![
                ("cancel_id", cancel_id.clone()),
                ("workflow_id", workflow_id.to_string()),
            ],
            Decision::SignalExternalWorkflow { signal_id, workflow_id, signal_name, .. } => vec![
                ("signal_id", signal_id.clone()),
                ("workflow_id", workflow_id.to_string()),
                ("signal_name", signal_name.clone()),
            ],
            Decision::RecordMarker { marker_name, marker_id, .. } => vec![
                ("marker_name", marker_name.clone()),
                ("marker_id", marker_id.clone()),
            ],
            Decision::UpsertSearchAttributes { attrs } => {
                vec![("keys", attrs.len().to_string())]
            }
            Decision::CompleteWorkflow { .. }
            | Decision::FailWorkflow { .. }
            | Decision::CancelWorkflow { .. }
            | Decision::ContinueAsNew { .. } => vec![],
        }
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
