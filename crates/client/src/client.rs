// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! High-level client operations against the workflow service.

use crate::retry::{with_retry, CallPolicy};
use crate::service::{RpcError, WorkflowService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use wl_core::execution::{RunId, WorkflowExecution, WorkflowId};
use wl_core::payload::Payloads;
use wl_proto::*;

/// Failure of a client-level operation, carrying the execution identity.
#[derive(Debug, Clone, Error)]
#[error("workflow {workflow_type} ({execution}) failed: {cause}")]
pub struct WorkflowExecutionError {
    pub execution: WorkflowExecution,
    pub workflow_type: String,
    #[source]
    pub cause: RpcError,
}

/// Options for starting an execution.
#[derive(Debug, Clone)]
pub struct StartOptions {
    pub workflow_id: WorkflowId,
    pub workflow_type: String,
    pub task_list: String,
    pub input: Payloads,
    pub workflow_task_timeout_ms: u64,
    pub execution_timeout_ms: Option<u64>,
    pub header: HashMap<String, String>,
}

impl StartOptions {
    pub fn new(
        workflow_id: impl Into<WorkflowId>,
        workflow_type: impl Into<String>,
        task_list: impl Into<String>,
        input: Payloads,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            workflow_type: workflow_type.into(),
            task_list: task_list.into(),
            input,
            workflow_task_timeout_ms: 10_000,
            execution_timeout_ms: None,
            header: HashMap::new(),
        }
    }

    wl_core::setters! {
        set {
            workflow_task_timeout_ms: u64,
            header: HashMap<String, String>,
        }
        option {
            execution_timeout_ms: u64,
        }
    }
}

/// User-facing handle for one namespace of the service.
pub struct WorkflowClient<S> {
    service: Arc<S>,
    namespace: String,
    identity: String,
    call_policy: CallPolicy,
    shutdown: CancellationToken,
}

impl<S: WorkflowService> WorkflowClient<S> {
    pub fn new(service: Arc<S>, namespace: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            service,
            namespace: namespace.into(),
            identity: identity.into(),
            call_policy: CallPolicy::default(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Start a new execution; returns its run ID.
    pub async fn start_workflow(&self, opts: StartOptions) -> Result<RunId, WorkflowExecutionError> {
        let request = self.start_request(&opts);
        let service = self.service.clone();
        with_retry(&self.call_policy, &self.shutdown, move || {
            let service = service.clone();
            let request = request.clone();
            async move { service.start_workflow_execution(request).await }
        })
        .await
        .map(|resp| resp.run_id)
        .map_err(|cause| self.execution_error(&opts, cause))
    }

    /// Signal an execution, starting it first if it does not exist.
    pub async fn signal_with_start(
        &self,
        opts: StartOptions,
        signal_name: impl Into<String>,
        signal_input: Payloads,
    ) -> Result<RunId, WorkflowExecutionError> {
        let request = SignalWithStartWorkflowExecutionRequest {
            start: self.start_request(&opts),
            signal_name: signal_name.into(),
            signal_input,
        };
        let service = self.service.clone();
        with_retry(&self.call_policy, &self.shutdown, move || {
            let service = service.clone();
            let request = request.clone();
            async move { service.signal_with_start_workflow_execution(request).await }
        })
        .await
        .map(|resp| resp.run_id)
        .map_err(|cause| self.execution_error(&opts, cause))
    }

    pub async fn request_cancel(&self, execution: WorkflowExecution) -> Result<(), RpcError> {
        let request = RequestCancelWorkflowExecutionRequest {
            namespace: self.namespace.clone(),
            execution,
            identity: self.identity.clone(),
        };
        let service = self.service.clone();
        with_retry(&self.call_policy, &self.shutdown, move || {
            let service = service.clone();
            let request = request.clone();
            async move { service.request_cancel_workflow_execution(request).await }
        })
        .await
    }

    pub async fn terminate(
        &self,
        execution: WorkflowExecution,
        reason: impl Into<String>,
    ) -> Result<(), RpcError> {
        let request = TerminateWorkflowExecutionRequest {
            namespace: self.namespace.clone(),
            execution,
            reason: reason.into(),
            identity: self.identity.clone(),
        };
        let service = self.service.clone();
        with_retry(&self.call_policy, &self.shutdown, move || {
            let service = service.clone();
            let request = request.clone();
            async move { service.terminate_workflow_execution(request).await }
        })
        .await
    }

    /// Fetch an execution's entire history, following page tokens.
    pub async fn get_history(
        &self,
        execution: WorkflowExecution,
    ) -> Result<Vec<HistoryEvent>, RpcError> {
        let mut events = Vec::new();
        let mut next_page_token = None;
        loop {
            let request = GetWorkflowExecutionHistoryRequest {
                namespace: self.namespace.clone(),
                execution: execution.clone(),
                next_page_token: next_page_token.clone(),
            };
            let service = self.service.clone();
            let response = with_retry(&self.call_policy, &self.shutdown, move || {
                let service = service.clone();
                let request = request.clone();
                async move { service.get_workflow_execution_history(request).await }
            })
            .await?;
            events.extend(response.events);
            match response.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => return Ok(events),
            }
        }
    }

    pub async fn list(
        &self,
        query: impl Into<String>,
        page_size: u32,
    ) -> Result<ListWorkflowExecutionsResponse, RpcError> {
        self.service
            .list_workflow_executions(ListWorkflowExecutionsRequest {
                namespace: self.namespace.clone(),
                query: query.into(),
                page_size,
                next_page_token: None,
            })
            .await
    }

    pub async fn scan(
        &self,
        query: impl Into<String>,
        page_size: u32,
    ) -> Result<ListWorkflowExecutionsResponse, RpcError> {
        self.service
            .scan_workflow_executions(ListWorkflowExecutionsRequest {
                namespace: self.namespace.clone(),
                query: query.into(),
                page_size,
                next_page_token: None,
            })
            .await
    }

    pub async fn count(&self, query: impl Into<String>) -> Result<i64, RpcError> {
        self.service
            .count_workflow_executions(CountWorkflowExecutionsRequest {
                namespace: self.namespace.clone(),
                query: query.into(),
            })
            .await
            .map(|resp| resp.count)
    }

    pub async fn get_search_attributes(&self) -> Result<HashMap<String, String>, RpcError> {
        self.service.get_search_attributes().await.map(|resp| resp.keys)
    }

    fn start_request(&self, opts: &StartOptions) -> StartWorkflowExecutionRequest {
        StartWorkflowExecutionRequest {
            namespace: self.namespace.clone(),
            workflow_id: opts.workflow_id.clone(),
            workflow_type: opts.workflow_type.clone(),
            task_list: opts.task_list.clone(),
            input: opts.input.clone(),
            identity: self.identity.clone(),
            workflow_task_timeout_ms: opts.workflow_task_timeout_ms,
            execution_timeout_ms: opts.execution_timeout_ms,
            header: opts.header.clone(),
        }
    }

    fn execution_error(&self, opts: &StartOptions, cause: RpcError) -> WorkflowExecutionError {
        WorkflowExecutionError {
            execution: WorkflowExecution::new(
                opts.workflow_id.as_str(),
                RunId::from_string(""),
            ),
            workflow_type: opts.workflow_type.clone(),
            cause,
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
