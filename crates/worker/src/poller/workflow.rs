// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow task poller.
//!
//! Maintains two logical queues (sticky and regular), runs the replay engine
//! over each polled task, drives the local-activity loop, and responds with
//! decisions, a first-attempt failure, or a query result. Heartbeat
//! completions flush partial decisions when a turn runs long.

use crate::cache::StickyCache;
use crate::config::WorkerConfig;
use crate::local::LocalActivityTunnel;
use crate::registry::WorkflowRegistry;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wl_client::{with_retry, CallPolicy, RpcError, WorkflowService};
use wl_core::clock::Clock;
use wl_core::execution::RunId;
use wl_core::propagator::ContextPropagator;
use wl_engine::{
    LocalActivityDisposition, ReplayError, WorkflowContext, WorkflowInfo,
};
use wl_proto::{
    Decision, GetWorkflowExecutionHistoryRequest, HistoryEvent, PollForWorkflowTaskRequest,
    RespondQueryTaskCompletedRequest, RespondWorkflowTaskCompletedRequest,
    RespondWorkflowTaskFailedRequest, StickyAttributes, WorkflowTask,
};

/// Fraction of the workflow task timeout a turn may consume before the
/// engine heartbeats partial decisions.
const HEARTBEAT_FRACTION: f64 = 0.8;

/// Which queue to long-poll next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Sticky,
    Regular,
}

wl_core::simple_display! {
    QueueKind {
        Sticky => "sticky",
        Regular => "regular",
    }
}

/// Queue selection for one poll slot.
///
/// Sticky-disabled workers always poll regular; a positive backlog hint
/// pins the next poll to sticky; otherwise the queue with fewer outstanding
/// polls wins, sticky taking ties.
pub fn choose_queue(
    sticky_enabled: bool,
    sticky_backlog: i64,
    pending_sticky: u32,
    pending_regular: u32,
) -> QueueKind {
    if !sticky_enabled {
        return QueueKind::Regular;
    }
    if sticky_backlog > 0 {
        return QueueKind::Sticky;
    }
    if pending_sticky <= pending_regular {
        QueueKind::Sticky
    } else {
        QueueKind::Regular
    }
}

/// Shared poll bookkeeping across all workflow poller loops.
#[derive(Debug, Default)]
pub(crate) struct PollCounters {
    pub pending_sticky: u32,
    pub pending_regular: u32,
    pub sticky_backlog: i64,
}

pub(crate) struct WorkflowTaskPoller<S, C: Clock> {
    pub service: Arc<S>,
    pub config: Arc<WorkerConfig>,
    pub workflows: WorkflowRegistry,
    pub cache: Arc<StickyCache>,
    pub tunnel: LocalActivityTunnel,
    pub counters: Arc<Mutex<PollCounters>>,
    pub call_policy: CallPolicy,
    pub shutdown: CancellationToken,
    pub clock: C,
    pub propagators: Arc<Vec<Arc<dyn ContextPropagator>>>,
}

impl<S: WorkflowService, C: Clock> WorkflowTaskPoller<S, C> {
    /// One poll loop; the worker runs `workflow_pollers` of these. Each
    /// polled task is processed to completion before the next poll, so a
    /// dispatcher run stays pinned to one loop for the task's duration.
    pub async fn run(self: Arc<Self>) {
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }
            let queue = {
                let mut counters = self.counters.lock();
                let queue = choose_queue(
                    self.config.sticky_enabled(),
                    counters.sticky_backlog,
                    counters.pending_sticky,
                    counters.pending_regular,
                );
                match queue {
                    QueueKind::Sticky => counters.pending_sticky += 1,
                    QueueKind::Regular => counters.pending_regular += 1,
                }
                queue
            };

            let request = PollForWorkflowTaskRequest {
                namespace: self.config.namespace.clone(),
                task_list: match queue {
                    QueueKind::Sticky => self.config.sticky_task_list(),
                    QueueKind::Regular => self.config.task_list.clone(),
                },
                identity: self.config.identity.clone(),
            };

            let service = self.service.clone();
            let polled = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    self.release_poll_slot(queue);
                    return;
                }
                result = with_retry(&self.call_policy, &self.shutdown, move || {
                    let service = service.clone();
                    let request = request.clone();
                    async move { service.poll_for_workflow_task(request).await }
                }) => result,
            };
            self.release_poll_slot(queue);

            match polled {
                Ok(response) => {
                    if let Some(task) = response.task {
                        self.counters.lock().sticky_backlog = task.sticky_backlog_hint;
                        self.process_task(task).await;
                    }
                }
                Err(RpcError::Canceled) => return,
                Err(err) => {
                    tracing::warn!(error = %err, queue = %queue, "workflow poll failed");
                }
            }
        }
    }

    fn release_poll_slot(&self, queue: QueueKind) {
        let mut counters = self.counters.lock();
        match queue {
            QueueKind::Sticky => counters.pending_sticky = counters.pending_sticky.saturating_sub(1),
            QueueKind::Regular => {
                counters.pending_regular = counters.pending_regular.saturating_sub(1)
            }
        }
    }

    async fn process_task(&self, task: WorkflowTask) {
        tracing::debug!(
            execution = %task.execution,
            started_event_id = task.started_event_id,
            attempt = task.attempt,
            "processing workflow task"
        );
        if task.is_query_only() {
            self.process_query_task(task).await;
            return;
        }

        let run_id = task.execution.run_id;
        let cached = self.cache.take(&run_id);
        let cache_hit = cached.is_some();
        let mut ctx = match cached {
            Some(ctx) => ctx,
            None => match self.build_context(&task) {
                Some(ctx) => ctx,
                None => {
                    self.fail_task(
                        &task,
                        &format!("workflow not registered: {}", task.workflow_type),
                    )
                    .await;
                    return;
                }
            },
        };

        let events = match self.resolve_events(&task, cache_hit, &ctx).await {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(error = %err, execution = %task.execution, "history fetch failed");
                return;
            }
        };

        let mut current_task = task;
        let mut events = events;
        loop {
            let turn_budget = Duration::from_millis(current_task.workflow_task_timeout_ms)
                .mul_f64(HEARTBEAT_FRACTION);
            let started = self.clock.now();
            let clock = self.clock.clone();
            let mut should_yield =
                move || clock.now().saturating_duration_since(started) > turn_budget;

            let outcome = ctx.process_events(
                &events,
                current_task.previous_started_event_id,
                &mut should_yield,
            );
            let mut outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    self.fail_replay(&current_task, &err).await;
                    return;
                }
            };

            if !outcome.budget_exceeded {
                if let Err(err) = self
                    .run_local_activities(&mut ctx, &mut outcome.decisions, &mut should_yield)
                    .await
                {
                    self.fail_replay(&current_task, &err).await;
                    return;
                }
            }

            // Piggybacked query: answered alongside the decisions.
            let query_results = match &current_task.query {
                Some(query) => match ctx.handle_query(query) {
                    Ok(result) => wl_proto::single_query_result(query, result),
                    Err(err) => {
                        tracing::warn!(error = %err, "piggybacked query failed");
                        HashMap::new()
                    }
                },
                None => HashMap::new(),
            };

            let request = RespondWorkflowTaskCompletedRequest {
                task_token: current_task.task_token,
                decisions: std::mem::take(&mut outcome.decisions),
                identity: self.config.identity.clone(),
                sticky_attributes: self.sticky_attributes(),
                force_create_new_task: outcome.budget_exceeded,
                query_results,
            };
            let service = self.service.clone();
            let response = with_retry(&self.call_policy, &self.shutdown, move || {
                let service = service.clone();
                let request = request.clone();
                async move { service.respond_workflow_task_completed(request).await }
            })
            .await;

            match response {
                Ok(response) => {
                    if outcome.budget_exceeded {
                        if let Some(new_task) = response.new_task {
                            // Continue the interrupted turn on the follow-up
                            // task's history delta.
                            events = new_task.history.clone();
                            current_task = new_task;
                            continue;
                        }
                        tracing::warn!(
                            execution = %current_task.execution,
                            "heartbeat completion returned no follow-up task"
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to deliver workflow task completion");
                    self.cache.evict(&run_id);
                    return;
                }
            }
            break;
        }

        if self.config.sticky_enabled() && !ctx.workflow_closed() {
            for evicted in self.cache.put(run_id, ctx) {
                self.reset_sticky(evicted).await;
            }
        }
    }

    /// Dispatch pending local activities and merge results until none
    /// remain. Results merge in completion order; each becomes a marker in
    /// the decision stream ahead of any cancellations it causes.
    async fn run_local_activities(
        &self,
        ctx: &mut WorkflowContext,
        decisions: &mut Vec<Decision>,
        should_yield: &mut (dyn FnMut() -> bool + Send),
    ) -> Result<(), ReplayError> {
        let mut pending = ctx.take_pending_local_activities();
        if pending.is_empty() {
            return Ok(());
        }

        let (reply_tx, mut reply_rx) = mpsc::channel(crate::local::TUNNEL_CAPACITY);
        let mut first_dispatch: HashMap<String, Instant> = HashMap::new();
        let mut outstanding = 0usize;

        loop {
            for request in pending.drain(..) {
                first_dispatch.entry(request.marker_id.clone()).or_insert_with(Instant::now);
                if !self.tunnel.dispatch(request, reply_tx.clone()).await {
                    // Tunnel closed: shutting down.
                    return Ok(());
                }
                outstanding += 1;
            }
            if outstanding == 0 {
                break;
            }

            let result = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                result = reply_rx.recv() => result,
            };
            let Some(mut result) = result else { break };
            outstanding -= 1;

            // Elapsed is measured from the first dispatch so the
            // schedule-to-close budget spans all attempts.
            if let Some(first) = first_dispatch.get(&result.marker_id) {
                result.elapsed = first.elapsed();
            }

            match ctx.apply_local_activity_result(result)? {
                LocalActivityDisposition::Recorded => {
                    let flush = ctx.run_and_flush(&mut *should_yield)?;
                    decisions.extend(flush.decisions);
                    pending.extend(ctx.take_pending_local_activities());
                }
                LocalActivityDisposition::Retry { request, delay } => {
                    outstanding += 1;
                    let tunnel = self.tunnel.clone();
                    let reply_tx = reply_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        tunnel.dispatch(request, reply_tx).await;
                    });
                }
            }
        }
        Ok(())
    }

    async fn process_query_task(&self, task: WorkflowTask) {
        let run_id = task.execution.run_id;
        let cached = self.cache.take(&run_id);
        let cache_hit = cached.is_some();
        let mut ctx = match cached {
            Some(ctx) => ctx,
            None => match self.build_context(&task) {
                Some(ctx) => ctx,
                None => {
                    self.respond_query(
                        &task,
                        Err(format!("workflow not registered: {}", task.workflow_type)),
                    )
                    .await;
                    return;
                }
            },
        };

        if !cache_hit {
            // Rebuild state by replaying the full history; everything is
            // replay, so no decisions leave this pass.
            let events = match self.resolve_events(&task, false, &ctx).await {
                Ok(events) => events,
                Err(err) => {
                    self.respond_query(&task, Err(err.to_string())).await;
                    return;
                }
            };
            if let Err(err) = ctx.process_events(&events, i64::MAX, &mut || false) {
                self.respond_query(&task, Err(err.to_string())).await;
                return;
            }
        }

        let result = match &task.query {
            Some(query) => ctx.handle_query(query).map_err(|e| e.to_string()),
            None => Err("query task without query".to_string()),
        };
        self.respond_query(&task, result).await;

        if self.config.sticky_enabled() {
            for evicted in self.cache.put(run_id, ctx) {
                self.reset_sticky(evicted).await;
            }
        }
    }

    async fn respond_query(
        &self,
        task: &WorkflowTask,
        result: Result<wl_core::payload::Payloads, String>,
    ) {
        let request = match result {
            Ok(result) => RespondQueryTaskCompletedRequest {
                task_token: task.task_token,
                result: Some(result),
                error_message: None,
            },
            Err(message) => RespondQueryTaskCompletedRequest {
                task_token: task.task_token,
                result: None,
                error_message: Some(message),
            },
        };
        let service = self.service.clone();
        let sent = with_retry(&self.call_policy, &self.shutdown, move || {
            let service = service.clone();
            let request = request.clone();
            async move { service.respond_query_task_completed(request).await }
        })
        .await;
        if let Err(err) = sent {
            tracing::warn!(error = %err, "failed to deliver query response");
        }
    }

    fn build_context(&self, task: &WorkflowTask) -> Option<WorkflowContext> {
        let workflow_fn = self.workflows.get(&task.workflow_type)?;
        let info = WorkflowInfo {
            namespace: self.config.namespace.clone(),
            execution: task.execution.clone(),
            workflow_type: task.workflow_type.clone(),
            task_list: self.config.task_list.clone(),
            attempt: task.attempt,
            workflow_task_timeout: Duration::from_millis(task.workflow_task_timeout_ms),
        };
        Some(WorkflowContext::new(info, workflow_fn, self.propagators.as_ref().clone()))
    }

    /// Assemble the event slice to feed the engine: the task's delta for a
    /// cache hit, the full history (paged if needed) otherwise.
    async fn resolve_events(
        &self,
        task: &WorkflowTask,
        cache_hit: bool,
        ctx: &WorkflowContext,
    ) -> Result<Vec<HistoryEvent>, RpcError> {
        let mut events = task.history.clone();
        let mut next_page_token = task.next_page_token.clone();
        while let Some(token) = next_page_token {
            let request = GetWorkflowExecutionHistoryRequest {
                namespace: self.config.namespace.clone(),
                execution: task.execution.clone(),
                next_page_token: Some(token),
            };
            let service = self.service.clone();
            let response = with_retry(&self.call_policy, &self.shutdown, move || {
                let service = service.clone();
                let request = request.clone();
                async move { service.get_workflow_execution_history(request).await }
            })
            .await?;
            events.extend(response.events);
            next_page_token = response.next_page_token;
        }

        if cache_hit {
            let last_processed = ctx.last_processed_event_id();
            events.retain(|e| e.event_id > last_processed);
            return Ok(events);
        }

        // Cache miss with a mid-stream delta: fetch from the beginning.
        if events.first().map(|e| e.event_id) > Some(1) {
            let request = GetWorkflowExecutionHistoryRequest {
                namespace: self.config.namespace.clone(),
                execution: task.execution.clone(),
                next_page_token: None,
            };
            let service = self.service.clone();
            let response = with_retry(&self.call_policy, &self.shutdown, move || {
                let service = service.clone();
                let request = request.clone();
                async move { service.get_workflow_execution_history(request).await }
            })
            .await?;
            events = response.events;
        }
        Ok(events)
    }

    /// Report a fatal replay error. Only the first attempt responds; later
    /// attempts are left to time out so the service throttles the workflow.
    async fn fail_replay(&self, task: &WorkflowTask, err: &ReplayError) {
        tracing::warn!(execution = %task.execution, error = %err, "workflow task failed");
        self.cache.evict(&task.execution.run_id);
        if task.attempt > 1 {
            return;
        }
        let request = RespondWorkflowTaskFailedRequest {
            task_token: task.task_token,
            cause: err.to_string(),
            failure: err.to_failure(),
            identity: self.config.identity.clone(),
        };
        let service = self.service.clone();
        let sent = with_retry(&self.call_policy, &self.shutdown, move || {
            let service = service.clone();
            let request = request.clone();
            async move { service.respond_workflow_task_failed(request).await }
        })
        .await;
        if let Err(err) = sent {
            tracing::warn!(error = %err, "failed to deliver workflow task failure");
        }
    }

    async fn fail_task(&self, task: &WorkflowTask, message: &str) {
        let err = ReplayError::Panic { message: message.to_string() };
        self.fail_replay(task, &err).await;
    }

    fn sticky_attributes(&self) -> Option<StickyAttributes> {
        if !self.config.sticky_enabled() {
            return None;
        }
        Some(StickyAttributes {
            worker_task_list: self.config.sticky_task_list(),
            schedule_to_start_timeout_ms: self
                .config
                .sticky_schedule_to_start_timeout
                .as_millis() as u64,
        })
    }

    async fn reset_sticky(&self, run_id: RunId) {
        let request = wl_proto::ResetStickyTaskListRequest {
            namespace: self.config.namespace.clone(),
            execution: wl_core::execution::WorkflowExecution::new("", run_id),
        };
        let service = self.service.clone();
        let sent = with_retry(&self.call_policy, &self.shutdown, move || {
            let service = service.clone();
            let request = request.clone();
            async move { service.reset_sticky_task_list(request).await }
        })
        .await;
        if let Err(err) = sent {
            tracing::warn!(error = %err, "failed to reset sticky task list");
        }
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
