// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response pairs for the service RPC surface.
//!
//! One struct per direction; methods without interesting output share the
//! unit response. Field names track the task and event DTOs.

use crate::decision::Decision;
use crate::event::HistoryEvent;
use crate::task::{ActivityTask, WorkflowQuery, WorkflowTask};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wl_core::execution::{RunId, TaskToken, WorkflowExecution, WorkflowId};
use wl_core::failure::Failure;
use wl_core::payload::Payloads;

/// Rate hint forwarded on activity polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskListMetadata {
    pub max_tasks_per_second: f64,
}

/// Sticky-queue routing attributes attached to completed workflow tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickyAttributes {
    pub worker_task_list: String,
    pub schedule_to_start_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollForWorkflowTaskRequest {
    pub namespace: String,
    pub task_list: String,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PollForWorkflowTaskResponse {
    /// Absent when the long poll expired without a matching task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<WorkflowTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondWorkflowTaskCompletedRequest {
    pub task_token: TaskToken,
    pub decisions: Vec<Decision>,
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky_attributes: Option<StickyAttributes>,
    /// Set on heartbeat completions: the service must immediately create the
    /// follow-up task carrying the rest of the work.
    #[serde(default)]
    pub force_create_new_task: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query_results: HashMap<String, Payloads>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RespondWorkflowTaskCompletedResponse {
    /// Follow-up task, present after a heartbeat completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_task: Option<WorkflowTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondWorkflowTaskFailedRequest {
    pub task_token: TaskToken,
    pub cause: String,
    pub failure: Failure,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollForActivityTaskRequest {
    pub namespace: String,
    pub task_list: String,
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_list_metadata: Option<TaskListMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PollForActivityTaskResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<ActivityTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondActivityTaskCompletedRequest {
    pub task_token: TaskToken,
    pub result: Payloads,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondActivityTaskFailedRequest {
    pub task_token: TaskToken,
    pub failure: Failure,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondActivityTaskCanceledRequest {
    pub task_token: TaskToken,
    pub details: Payloads,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordActivityTaskHeartbeatRequest {
    pub task_token: TaskToken,
    pub details: Payloads,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecordActivityTaskHeartbeatResponse {
    #[serde(default)]
    pub cancel_requested: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetWorkflowExecutionHistoryRequest {
    pub namespace: String,
    pub execution: WorkflowExecution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GetWorkflowExecutionHistoryResponse {
    pub events: Vec<HistoryEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetStickyTaskListRequest {
    pub namespace: String,
    pub execution: WorkflowExecution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondQueryTaskCompletedRequest {
    pub task_token: TaskToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Payloads>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartWorkflowExecutionRequest {
    pub namespace: String,
    pub workflow_id: WorkflowId,
    pub workflow_type: String,
    pub task_list: String,
    pub input: Payloads,
    pub identity: String,
    pub workflow_task_timeout_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub header: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartWorkflowExecutionResponse {
    pub run_id: RunId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalWithStartWorkflowExecutionRequest {
    #[serde(flatten)]
    pub start: StartWorkflowExecutionRequest,
    pub signal_name: String,
    pub signal_input: Payloads,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelWorkflowExecutionRequest {
    pub namespace: String,
    pub execution: WorkflowExecution,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminateWorkflowExecutionRequest {
    pub namespace: String,
    pub execution: WorkflowExecution,
    pub reason: String,
    pub identity: String,
}

/// Close status of a listed execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowExecutionStatus {
    Running,
    Completed,
    Failed,
    Canceled,
    Terminated,
    ContinuedAsNew,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionInfo {
    pub execution: WorkflowExecution,
    pub workflow_type: String,
    pub status: WorkflowExecutionStatus,
    pub start_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListWorkflowExecutionsRequest {
    pub namespace: String,
    /// Visibility query string; syntax is service-defined.
    pub query: String,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ListWorkflowExecutionsResponse {
    pub executions: Vec<WorkflowExecutionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountWorkflowExecutionsRequest {
    pub namespace: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CountWorkflowExecutionsResponse {
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GetSearchAttributesResponse {
    /// Registered attribute key → value type name.
    pub keys: HashMap<String, String>,
}

/// Convenience: build a query-result map for a piggybacked query response.
pub fn single_query_result(query: &WorkflowQuery, result: Payloads) -> HashMap<String, Payloads> {
    let mut map = HashMap::new();
    map.insert(query.query_type.clone(), result);
    map
}
