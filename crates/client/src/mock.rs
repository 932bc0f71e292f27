// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory service for tests.
//!
//! Workflow and activity tasks are scripted into FIFO queues; every worker
//! response is recorded for assertions. Heartbeat handling is a synchronous
//! interception seam: the registered callback computes each response under
//! the mock's lock, so nothing is mutated after registration.

use crate::service::{RpcError, WorkflowService};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use wl_core::execution::RunId;
use wl_proto::*;

type HeartbeatFn = Box<
    dyn Fn(&RecordActivityTaskHeartbeatRequest) -> RecordActivityTaskHeartbeatResponse
        + Send
        + Sync,
>;

#[derive(Default)]
struct MockState {
    workflow_tasks: VecDeque<WorkflowTask>,
    sticky_workflow_tasks: VecDeque<WorkflowTask>,
    activity_tasks: VecDeque<ActivityTask>,
    /// Tasks handed out as follow-ups to heartbeat completions.
    follow_up_tasks: VecDeque<WorkflowTask>,

    pub completed: Vec<RespondWorkflowTaskCompletedRequest>,
    pub failed: Vec<RespondWorkflowTaskFailedRequest>,
    pub query_completed: Vec<RespondQueryTaskCompletedRequest>,
    pub activity_completed: Vec<RespondActivityTaskCompletedRequest>,
    pub activity_failed: Vec<RespondActivityTaskFailedRequest>,
    pub activity_canceled: Vec<RespondActivityTaskCanceledRequest>,
    pub heartbeats: Vec<RecordActivityTaskHeartbeatRequest>,
    pub sticky_resets: Vec<ResetStickyTaskListRequest>,
    pub started: Vec<StartWorkflowExecutionRequest>,

    histories: HashMap<String, Vec<HistoryEvent>>,
    executions: Vec<WorkflowExecutionInfo>,
    search_attribute_keys: HashMap<String, String>,

    on_heartbeat: Option<HeartbeatFn>,
    start_failures: VecDeque<RpcError>,
}

/// Scripted in-memory [`WorkflowService`].
pub struct MockService {
    state: Arc<Mutex<MockState>>,
    workflow_notify: Notify,
    activity_notify: Notify,
    /// How long an empty poll waits before returning no-task, emulating the
    /// service-side long-poll expiry.
    empty_poll_delay: Duration,
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            workflow_notify: Notify::new(),
            activity_notify: Notify::new(),
            empty_poll_delay: Duration::from_millis(50),
        }
    }

    pub fn with_empty_poll_delay(mut self, delay: Duration) -> Self {
        self.empty_poll_delay = delay;
        self
    }

    // ---- scripting -----------------------------------------------------

    pub fn enqueue_workflow_task(&self, task: WorkflowTask) {
        self.state.lock().workflow_tasks.push_back(task);
        self.workflow_notify.notify_waiters();
    }

    pub fn enqueue_sticky_workflow_task(&self, task: WorkflowTask) {
        self.state.lock().sticky_workflow_tasks.push_back(task);
        self.workflow_notify.notify_waiters();
    }

    pub fn enqueue_activity_task(&self, task: ActivityTask) {
        self.state.lock().activity_tasks.push_back(task);
        self.activity_notify.notify_waiters();
    }

    pub fn enqueue_follow_up_task(&self, task: WorkflowTask) {
        self.state.lock().follow_up_tasks.push_back(task);
    }

    pub fn set_history(&self, run_id: impl Into<String>, events: Vec<HistoryEvent>) {
        self.state.lock().histories.insert(run_id.into(), events);
    }

    pub fn add_execution_info(&self, info: WorkflowExecutionInfo) {
        self.state.lock().executions.push(info);
    }

    pub fn set_search_attribute_keys(&self, keys: HashMap<String, String>) {
        self.state.lock().search_attribute_keys = keys;
    }

    /// Install the heartbeat seam. The callback runs synchronously under the
    /// mock's lock for every `record_activity_task_heartbeat` call.
    pub fn on_heartbeat(
        &self,
        f: impl Fn(&RecordActivityTaskHeartbeatRequest) -> RecordActivityTaskHeartbeatResponse
            + Send
            + Sync
            + 'static,
    ) {
        self.state.lock().on_heartbeat = Some(Box::new(f));
    }

    /// Fail the next start call with the given error.
    pub fn fail_next_start(&self, err: RpcError) {
        self.state.lock().start_failures.push_back(err);
    }

    // ---- assertions ----------------------------------------------------

    pub fn completed_requests(&self) -> Vec<RespondWorkflowTaskCompletedRequest> {
        self.state.lock().completed.clone()
    }

    pub fn failed_requests(&self) -> Vec<RespondWorkflowTaskFailedRequest> {
        self.state.lock().failed.clone()
    }

    pub fn query_responses(&self) -> Vec<RespondQueryTaskCompletedRequest> {
        self.state.lock().query_completed.clone()
    }

    pub fn activity_completions(&self) -> Vec<RespondActivityTaskCompletedRequest> {
        self.state.lock().activity_completed.clone()
    }

    pub fn activity_failures(&self) -> Vec<RespondActivityTaskFailedRequest> {
        self.state.lock().activity_failed.clone()
    }

    pub fn activity_cancellations(&self) -> Vec<RespondActivityTaskCanceledRequest> {
        self.state.lock().activity_canceled.clone()
    }

    pub fn heartbeat_requests(&self) -> Vec<RecordActivityTaskHeartbeatRequest> {
        self.state.lock().heartbeats.clone()
    }

    pub fn sticky_reset_requests(&self) -> Vec<ResetStickyTaskListRequest> {
        self.state.lock().sticky_resets.clone()
    }

    pub fn started_requests(&self) -> Vec<StartWorkflowExecutionRequest> {
        self.state.lock().started.clone()
    }

    async fn wait_empty_poll(&self) {
        tokio::time::sleep(self.empty_poll_delay).await;
    }
}

#[async_trait]
impl WorkflowService for MockService {
    async fn poll_for_workflow_task(
        &self,
        request: PollForWorkflowTaskRequest,
    ) -> Result<PollForWorkflowTaskResponse, RpcError> {
        let sticky = request.task_list.contains(":sticky");
        loop {
            {
                let mut state = self.state.lock();
                let queue = if sticky {
                    &mut state.sticky_workflow_tasks
                } else {
                    &mut state.workflow_tasks
                };
                if let Some(task) = queue.pop_front() {
                    return Ok(PollForWorkflowTaskResponse { task: Some(task) });
                }
            }
            tokio::select! {
                _ = self.workflow_notify.notified() => {}
                _ = self.wait_empty_poll() => return Ok(PollForWorkflowTaskResponse::default()),
            }
        }
    }

    async fn respond_workflow_task_completed(
        &self,
        request: RespondWorkflowTaskCompletedRequest,
    ) -> Result<RespondWorkflowTaskCompletedResponse, RpcError> {
        let mut state = self.state.lock();
        let new_task = if request.force_create_new_task {
            state.follow_up_tasks.pop_front()
        } else {
            None
        };
        state.completed.push(request);
        Ok(RespondWorkflowTaskCompletedResponse { new_task })
    }

    async fn respond_workflow_task_failed(
        &self,
        request: RespondWorkflowTaskFailedRequest,
    ) -> Result<(), RpcError> {
        self.state.lock().failed.push(request);
        Ok(())
    }

    async fn poll_for_activity_task(
        &self,
        _request: PollForActivityTaskRequest,
    ) -> Result<PollForActivityTaskResponse, RpcError> {
        loop {
            if let Some(task) = self.state.lock().activity_tasks.pop_front() {
                return Ok(PollForActivityTaskResponse { task: Some(task) });
            }
            tokio::select! {
                _ = self.activity_notify.notified() => {}
                _ = self.wait_empty_poll() => return Ok(PollForActivityTaskResponse::default()),
            }
        }
    }

    async fn respond_activity_task_completed(
        &self,
        request: RespondActivityTaskCompletedRequest,
    ) -> Result<(), RpcError> {
        self.state.lock().activity_completed.push(request);
        Ok(())
    }

    async fn respond_activity_task_failed(
        &self,
        request: RespondActivityTaskFailedRequest,
    ) -> Result<(), RpcError> {
        self.state.lock().activity_failed.push(request);
        Ok(())
    }

    async fn respond_activity_task_canceled(
        &self,
        request: RespondActivityTaskCanceledRequest,
    ) -> Result<(), RpcError> {
        self.state.lock().activity_canceled.push(request);
        Ok(())
    }

    async fn record_activity_task_heartbeat(
        &self,
        request: RecordActivityTaskHeartbeatRequest,
    ) -> Result<RecordActivityTaskHeartbeatResponse, RpcError> {
        let mut state = self.state.lock();
        let response = match &state.on_heartbeat {
            Some(f) => f(&request),
            None => RecordActivityTaskHeartbeatResponse::default(),
        };
        state.heartbeats.push(request);
        Ok(response)
    }

    async fn get_workflow_execution_history(
        &self,
        request: GetWorkflowExecutionHistoryRequest,
    ) -> Result<GetWorkflowExecutionHistoryResponse, RpcError> {
        let state = self.state.lock();
        match state.histories.get(request.execution.run_id.as_str()) {
            Some(events) => Ok(GetWorkflowExecutionHistoryResponse {
                events: events.clone(),
                next_page_token: None,
            }),
            None => Err(RpcError::NotFound(request.execution.to_string())),
        }
    }

    async fn reset_sticky_task_list(
        &self,
        request: ResetStickyTaskListRequest,
    ) -> Result<(), RpcError> {
        self.state.lock().sticky_resets.push(request);
        Ok(())
    }

    async fn respond_query_task_completed(
        &self,
        request: RespondQueryTaskCompletedRequest,
    ) -> Result<(), RpcError> {
        self.state.lock().query_completed.push(request);
        Ok(())
    }

    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RpcError> {
        let mut state = self.state.lock();
        if let Some(err) = state.start_failures.pop_front() {
            return Err(err);
        }
        state.started.push(request);
        Ok(StartWorkflowExecutionResponse { run_id: RunId::new() })
    }

    async fn signal_with_start_workflow_execution(
        &self,
        request: SignalWithStartWorkflowExecutionRequest,
    ) -> Result<StartWorkflowExecutionResponse, RpcError> {
        let mut state = self.state.lock();
        if let Some(err) = state.start_failures.pop_front() {
            return Err(err);
        }
        state.started.push(request.start);
        Ok(StartWorkflowExecutionResponse { run_id: RunId::new() })
    }

    async fn request_cancel_workflow_execution(
        &self,
        _request: RequestCancelWorkflowExecutionRequest,
    ) -> Result<(), RpcError> {
        Ok(())
    }

    async fn terminate_workflow_execution(
        &self,
        _request: TerminateWorkflowExecutionRequest,
    ) -> Result<(), RpcError> {
        Ok(())
    }

    async fn list_workflow_executions(
        &self,
        request: ListWorkflowExecutionsRequest,
    ) -> Result<ListWorkflowExecutionsResponse, RpcError> {
        let state = self.state.lock();
        let executions = state
            .executions
            .iter()
            .take(request.page_size as usize)
            .cloned()
            .collect();
        Ok(ListWorkflowExecutionsResponse { executions, next_page_token: None })
    }

    async fn scan_workflow_executions(
        &self,
        request: ListWorkflowExecutionsRequest,
    ) -> Result<ListWorkflowExecutionsResponse, RpcError> {
        self.list_workflow_executions(request).await
    }

    async fn count_workflow_executions(
        &self,
        _request: CountWorkflowExecutionsRequest,
    ) -> Result<CountWorkflowExecutionsResponse, RpcError> {
        Ok(CountWorkflowExecutionsResponse { count: self.state.lock().executions.len() as i64 })
    }

    async fn get_search_attributes(&self) -> Result<GetSearchAttributesResponse, RpcError> {
        Ok(GetSearchAttributesResponse { keys: self.state.lock().search_attribute_keys.clone() })
    }
}
