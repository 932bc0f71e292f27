// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task envelopes delivered by the service pollers.

use crate::event::HistoryEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wl_core::execution::{ActivityId, TaskToken, WorkflowExecution};
use wl_core::payload::Payloads;
use wl_core::retry::RetryPolicy;

/// A query attached to a workflow task (or delivered as a query-only task).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowQuery {
    pub query_type: String,
    #[serde(default, skip_serializing_if = "Payloads::is_empty")]
    pub args: Payloads,
}

/// Unit of work for a workflow worker: the history delta since the last
/// decision, plus everything needed to replay from scratch on a cache miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTask {
    pub task_token: TaskToken,
    pub execution: WorkflowExecution,
    pub workflow_type: String,
    /// Event ID of the `task:started` event of the previous decision turn;
    /// 0 on the first task. Events at or below this ID are replay.
    pub previous_started_event_id: i64,
    /// Event ID of this task's `task:started` event.
    pub started_event_id: i64,
    pub attempt: u32,
    pub history: Vec<HistoryEvent>,
    /// Present when the history was truncated; page through
    /// `GetWorkflowExecutionHistory` to fetch the rest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    /// Present on query-only tasks; no decisions may be produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<WorkflowQuery>,
    /// Service hint: number of tasks waiting on this worker's sticky queue.
    #[serde(default)]
    pub sticky_backlog_hint: i64,
    pub workflow_task_timeout_ms: u64,
}

impl WorkflowTask {
    pub fn is_query_only(&self) -> bool {
        self.query.is_some() && self.started_event_id == 0
    }
}

/// Unit of work for an activity worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTask {
    pub task_token: TaskToken,
    pub activity_id: ActivityId,
    pub activity_type: String,
    pub input: Payloads,
    pub execution: WorkflowExecution,
    pub workflow_type: String,
    pub attempt: u32,
    pub scheduled_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_to_close_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_to_start_ms: Option<u64>,
    pub start_to_close_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub header: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Payloads::is_empty")]
    pub heartbeat_details: Payloads,
}

/// Test builder for workflow tasks. Every build gets its own task token;
/// the execution defaults to the fixture identity shared across crates.
#[cfg(any(test, feature = "test-support"))]
pub struct WorkflowTaskBuilder {
    task_token: TaskToken,
    execution: WorkflowExecution,
    workflow_type: String,
    previous_started_event_id: i64,
    started_event_id: i64,
    attempt: u32,
    history: Vec<HistoryEvent>,
    next_page_token: Option<String>,
    query: Option<WorkflowQuery>,
    sticky_backlog_hint: i64,
    workflow_task_timeout_ms: u64,
}

#[cfg(any(test, feature = "test-support"))]
impl WorkflowTask {
    /// Create a builder with test defaults.
    pub fn builder() -> WorkflowTaskBuilder {
        WorkflowTaskBuilder {
            task_token: TaskToken::new(),
            execution: WorkflowExecution::new(
                "test-wf",
                wl_core::execution::RunId::from_string("run-test"),
            ),
            workflow_type: "TestWorkflow".to_string(),
            previous_started_event_id: 0,
            started_event_id: 0,
            attempt: 1,
            history: Vec::new(),
            next_page_token: None,
            query: None,
            sticky_backlog_hint: 0,
            workflow_task_timeout_ms: 10_000,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WorkflowTaskBuilder {
    wl_core::setters! {
        into {
            workflow_type: String,
        }
        set {
            task_token: TaskToken,
            execution: WorkflowExecution,
            previous_started_event_id: i64,
            started_event_id: i64,
            attempt: u32,
            history: Vec<HistoryEvent>,
            sticky_backlog_hint: i64,
            workflow_task_timeout_ms: u64,
        }
        option {
            next_page_token: String,
            query: WorkflowQuery,
        }
    }

    pub fn build(self) -> WorkflowTask {
        WorkflowTask {
            task_token: self.task_token,
            execution: self.execution,
            workflow_type: self.workflow_type,
            previous_started_event_id: self.previous_started_event_id,
            started_event_id: self.started_event_id,
            attempt: self.attempt,
            history: self.history,
            next_page_token: self.next_page_token,
            query: self.query,
            sticky_backlog_hint: self.sticky_backlog_hint,
            workflow_task_timeout_ms: self.workflow_task_timeout_ms,
        }
    }
}

/// Test builder for activity tasks.
#[cfg(any(test, feature = "test-support"))]
pub struct ActivityTaskBuilder {
    task_token: TaskToken,
    activity_id: ActivityId,
    activity_type: String,
    input: Payloads,
    execution: WorkflowExecution,
    workflow_type: String,
    attempt: u32,
    scheduled_at_ms: u64,
    schedule_to_close_ms: Option<u64>,
    schedule_to_start_ms: Option<u64>,
    start_to_close_ms: u64,
    heartbeat_timeout_ms: Option<u64>,
    retry_policy: Option<RetryPolicy>,
    header: HashMap<String, String>,
    heartbeat_details: Payloads,
}

#[cfg(any(test, feature = "test-support"))]
impl ActivityTask {
    /// Create a builder with test defaults.
    pub fn builder() -> ActivityTaskBuilder {
        ActivityTaskBuilder {
            task_token: TaskToken::new(),
            activity_id: ActivityId::new("1"),
            activity_type: "TestActivity".to_string(),
            input: Payloads::new(),
            execution: WorkflowExecution::new(
                "test-wf",
                wl_core::execution::RunId::from_string("run-test"),
            ),
            workflow_type: "TestWorkflow".to_string(),
            attempt: 1,
            scheduled_at_ms: 0,
            schedule_to_close_ms: None,
            schedule_to_start_ms: None,
            start_to_close_ms: 10_000,
            heartbeat_timeout_ms: None,
            retry_policy: None,
            header: HashMap::new(),
            heartbeat_details: Payloads::new(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ActivityTaskBuilder {
    wl_core::setters! {
        into {
            activity_type: String,
        }
        set {
            task_token: TaskToken,
            activity_id: ActivityId,
            input: Payloads,
            execution: WorkflowExecution,
            attempt: u32,
            scheduled_at_ms: u64,
            start_to_close_ms: u64,
            heartbeat_details: Payloads,
        }
        option {
            schedule_to_close_ms: u64,
            schedule_to_start_ms: u64,
            heartbeat_timeout_ms: u64,
            retry_policy: RetryPolicy,
        }
    }

    pub fn build(self) -> ActivityTask {
        ActivityTask {
            task_token: self.task_token,
            activity_id: self.activity_id,
            activity_type: self.activity_type,
            input: self.input,
            execution: self.execution,
            workflow_type: self.workflow_type,
            attempt: self.attempt,
            scheduled_at_ms: self.scheduled_at_ms,
            schedule_to_close_ms: self.schedule_to_close_ms,
            schedule_to_start_ms: self.schedule_to_start_ms,
            start_to_close_ms: self.start_to_close_ms,
            heartbeat_timeout_ms: self.heartbeat_timeout_ms,
            retry_policy: self.retry_policy,
            header: self.header,
            heartbeat_details: self.heartbeat_details,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
