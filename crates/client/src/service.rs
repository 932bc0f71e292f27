// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The remote workflow service, as the worker sees it.

use async_trait::async_trait;
use thiserror::Error;
use wl_proto::*;

/// RPC failure classification.
///
/// Transient variants are retried by [`crate::with_retry`]; everything else
/// surfaces to the caller immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("network: {0}")]
    Network(String),
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("call canceled")]
    Canceled,
    #[error("internal: {0}")]
    Internal(String),
}

impl RpcError {
    /// Whether the common retry wrapper may try the call again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RpcError::Unavailable(_)
                | RpcError::Network(_)
                | RpcError::ResourceExhausted(_)
                | RpcError::DeadlineExceeded
        )
    }
}

/// The well-known method set of the history service.
///
/// Poll methods are service-side long polls (~1 minute); callers bound them
/// with a client-side deadline and cancel them on shutdown.
#[async_trait]
pub trait WorkflowService: Send + Sync + 'static {
    async fn poll_for_workflow_task(
        &self,
        request: PollForWorkflowTaskRequest,
    ) -> Result<PollForWorkflowTaskResponse, RpcError>;

    async fn respond_workflow_task_completed(
        &self,
        request: RespondWorkflowTaskCompletedRequest,
    ) -> Result<RespondWorkflowTaskCompletedResponse, RpcError>;

    async fn respond_workflow_task_failed(
        &self,
        request: RespondWorkflowTaskFailedRequest,
    ) -> Result<(), RpcError>;

    async fn poll_for_activity_task(
        &self,
        request: PollForActivityTaskRequest,
    ) -> Result<PollForActivityTaskResponse, RpcError>;

    async fn respond_activity_task_completed(
        &self,
        request: RespondActivityTaskCompletedRequest,
    ) -> Result<(), RpcError>;

    async fn respond_activity_task_failed(
        &self,
        request: RespondActivityTaskFailedRequest,
    ) -> Result<(), RpcError>;

    async fn respond_activity_task_canceled(
        &self,
        request: RespondActivityTaskCanceledRequest,
    ) -> Result<(), RpcError>;

    async fn record_activity_task_heartbeat(
        &self,
        request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, RpcError>;

    async fn get_workflow_execution_history(
        &self,
        request: GetWorkflowExecutionHistoryRequest,
    ) -> Result<GetWorkflowExecutionHistoryResponse, RpcError>;

    async fn reset_sticky_task_list(
        &self,
        request: ResetStickyTaskListRequest,
    ) -> Result<(), RpcError>;

    async fn respond_query_task_completed(
        &self,
        request: RespondQueryTaskCompletedRequest,
    ) -> Result<(), RpcError>;

    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RpcError>;

    async fn signal_with_start_workflow_execution(
        &self,
        request: SignalWithStartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RpcError>;

    async fn request_cancel_workflow_execution(
        &self,
        request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<(), RpcError>;

    async fn terminate_workflow_execution(
        &self,
        request: TerminateWorkflowExecutionRequest,
    ) -> Result<(), RpcError>;

    async fn list_workflow_executions(
        &self,
        request: ListWorkflowExecutionsRequest,
    ) -> Result<ListWorkflowExecutionsResponse, RpcError>;

    async fn scan_workflow_executions(
        &self,
        request: ListWorkflowExecutionsRequest,
    ) -> Result<ListWorkflowExecutionsResponse, RpcError>;

    async fn count_workflow_executions(
        &self,
        request: CountWorkflowExecutionsRequest,
    ) -> Result<CountWorkflowExecutionsResponse, RpcError>;

    async fn get_search_attributes(&self) -> Result<GetSearchAttributesResponse, RpcError>;
}
