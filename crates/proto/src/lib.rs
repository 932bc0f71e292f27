// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wl-proto: Wire DTOs exchanged with the workflow history service.
//!
//! History events, decisions, task envelopes, and the request/response pairs
//! for every RPC the worker and client consume. JSON on the wire, tagged in
//! `{"type": "scope:name", ...fields}` format.

mod decision;
mod event;
mod history;
mod rpc;
mod task;

pub use decision::{
    Decision, MARKER_LOCAL_ACTIVITY, MARKER_MUTABLE_SIDE_EFFECT, MARKER_SIDE_EFFECT,
    MARKER_VERSION,
};
pub use event::{EventAttrs, HistoryEvent};
pub use history::HistoryWindow;
pub use rpc::{
    single_query_result, CountWorkflowExecutionsRequest, CountWorkflowExecutionsResponse,
    GetSearchAttributesResponse, GetWorkflowExecutionHistoryRequest,
    GetWorkflowExecutionHistoryResponse, ListWorkflowExecutionsRequest,
    ListWorkflowExecutionsResponse, PollForActivityTaskRequest, PollForActivityTaskResponse,
    PollForWorkflowTaskRequest, PollForWorkflowTaskResponse, RecordActivityTaskHeartbeatRequest,
    RecordActivityTaskHeartbeatResponse, RequestCancelWorkflowExecutionRequest,
    ResetStickyTaskListRequest, RespondActivityTaskCanceledRequest,
    RespondActivityTaskCompletedRequest, RespondActivityTaskFailedRequest,
    RespondQueryTaskCompletedRequest, RespondWorkflowTaskCompletedRequest,
    RespondWorkflowTaskCompletedResponse, RespondWorkflowTaskFailedRequest,
    SignalWithStartWorkflowExecutionRequest, StartWorkflowExecutionRequest,
    StartWorkflowExecutionResponse, StickyAttributes, TaskListMetadata,
    TerminateWorkflowExecutionRequest, WorkflowExecutionInfo, WorkflowExecutionStatus,
};
pub use task::{ActivityTask, WorkflowQuery, WorkflowTask};
