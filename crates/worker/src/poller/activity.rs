// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The activity task poller.
//!
//! One queue, a bounded execution pool, and per-task deadline plus
//! heartbeat plumbing. Outcomes are translated into the matching response
//! RPC with backoff-retried delivery.

use crate::config::WorkerConfig;
use crate::heartbeat::{spawn_heartbeat_loop, HeartbeatHandle};
use crate::registry::{ActivityRegistry, ActivityResult};
use futures_util::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use wl_client::{with_retry, CallPolicy, RpcError, WorkflowService};
use wl_core::error::{TimeoutKind, WorkflowError, PANIC_ERROR_TYPE};
use wl_core::failure::{encode_error, Failure, FailureInfo};
use wl_core::payload::Payloads;
use wl_proto::{
    ActivityTask, PollForActivityTaskRequest, RespondActivityTaskCanceledRequest,
    RespondActivityTaskCompletedRequest, RespondActivityTaskFailedRequest, TaskListMetadata,
};

/// Context handed to activity implementations (remote and local).
#[derive(Clone)]
pub struct ActivityContext {
    pub attempt: u32,
    /// Full task envelope; absent for local activities.
    pub task: Option<Arc<ActivityTask>>,
    heartbeat: Option<HeartbeatHandle>,
    cancel: CancellationToken,
}

impl ActivityContext {
    pub(crate) fn local(attempt: u32, cancel: CancellationToken) -> Self {
        Self { attempt, task: None, heartbeat: None, cancel }
    }

    pub(crate) fn remote(
        task: Arc<ActivityTask>,
        heartbeat: Option<HeartbeatHandle>,
        cancel: CancellationToken,
    ) -> Self {
        Self { attempt: task.attempt, task: Some(task), heartbeat, cancel }
    }

    /// Buffer heartbeat details; a background loop flushes them.
    pub fn heartbeat(&self, details: Payloads) {
        if let Some(heartbeat) = &self.heartbeat {
            heartbeat.record(details);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

pub(crate) struct ActivityTaskPoller<S> {
    pub service: Arc<S>,
    pub config: Arc<WorkerConfig>,
    pub activities: ActivityRegistry,
    pub slots: Arc<Semaphore>,
    pub call_policy: CallPolicy,
    pub shutdown: CancellationToken,
}

impl<S: WorkflowService> ActivityTaskPoller<S> {
    /// One poll loop; the worker runs `activity_pollers` of these.
    pub async fn run(self: Arc<Self>) {
        loop {
            let permit = tokio::select! {
                _ = self.shutdown.cancelled() => return,
                permit = self.slots.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };

            let request = PollForActivityTaskRequest {
                namespace: self.config.namespace.clone(),
                task_list: self.config.task_list.clone(),
                identity: self.config.identity.clone(),
                task_list_metadata: self
                    .config
                    .activity_tasks_per_second
                    .map(|rate| TaskListMetadata { max_tasks_per_second: rate }),
            };

            let service = self.service.clone();
            let polled = tokio::select! {
                _ = self.shutdown.cancelled() => return,
                result = with_retry(&self.call_policy, &self.shutdown, move || {
                    let service = service.clone();
                    let request = request.clone();
                    async move { service.poll_for_activity_task(request).await }
                }) => result,
            };

            match polled {
                Ok(response) => {
                    if let Some(task) = response.task {
                        let poller = self.clone();
                        tokio::spawn(async move {
                            let _permit = permit;
                            poller.process(task).await;
                        });
                    }
                }
                Err(RpcError::Canceled) => return,
                Err(err) => {
                    tracing::warn!(error = %err, "activity poll failed");
                }
            }
        }
    }

    async fn process(&self, task: ActivityTask) {
        let task = Arc::new(task);
        tracing::debug!(
            activity_type = %task.activity_type,
            activity_id = %task.activity_id,
            attempt = task.attempt,
            "processing activity task"
        );

        let Some(activity_fn) = self.activities.get(&task.activity_type) else {
            let failure = encode_error(&WorkflowError::Application {
                message: format!("activity not registered: {}", task.activity_type),
                error_type: "NotRegisteredError".into(),
                non_retryable: true,
                details: Payloads::new(),
                cause: None,
            });
            self.respond_failed(&task, failure).await;
            return;
        };

        // Deadline: start-to-close, bounded above by schedule-to-close.
        let mut deadline = Duration::from_millis(task.start_to_close_ms);
        if let Some(schedule_to_close) = task.schedule_to_close_ms {
            deadline = deadline.min(Duration::from_millis(schedule_to_close));
        }

        let cancel = CancellationToken::new();
        let (heartbeat, heartbeat_join) = match task.heartbeat_timeout_ms {
            Some(timeout_ms) => {
                let (handle, join) = spawn_heartbeat_loop(
                    self.service.clone(),
                    task.task_token,
                    self.config.identity.clone(),
                    Duration::from_millis(timeout_ms),
                    cancel.clone(),
                );
                (Some(handle), Some(join))
            }
            None => (None, None),
        };

        let ctx = ActivityContext::remote(task.clone(), heartbeat, cancel.clone());
        let invocation = activity_fn(ctx, task.input.clone());
        let run = tokio::time::timeout(
            deadline,
            std::panic::AssertUnwindSafe(invocation).catch_unwind(),
        )
        .await;

        // Finishing (or timing out) tears down the heartbeat loop; user code
        // parked on `cancelled()` observes it as well.
        cancel.cancel();
        if let Some(join) = heartbeat_join {
            let _ = join.await;
        }

        match run {
            Err(_elapsed) => {
                let failure =
                    encode_error(&WorkflowError::timeout(TimeoutKind::StartToClose));
                self.respond_failed(&task, failure).await;
            }
            Ok(Err(panic)) => {
                let failure = panic_failure(panic.as_ref());
                self.respond_failed(&task, failure).await;
            }
            Ok(Ok(Ok(ActivityResult::Completed(result)))) => {
                let request = RespondActivityTaskCompletedRequest {
                    task_token: task.task_token,
                    result,
                    identity: self.config.identity.clone(),
                };
                let service = self.service.clone();
                let sent = with_retry(&self.call_policy, &self.shutdown, move || {
                    let service = service.clone();
                    let request = request.clone();
                    async move { service.respond_activity_task_completed(request).await }
                })
                .await;
                if let Err(err) = sent {
                    tracing::warn!(error = %err, "failed to deliver activity completion");
                }
            }
            Ok(Ok(Ok(ActivityResult::Pending))) => {
                // Will be completed asynchronously by an external client.
                tracing::debug!(activity_id = %task.activity_id, "activity left pending");
            }
            Ok(Ok(Err(err))) if err.is_canceled() => {
                let details = match err {
                    WorkflowError::Canceled { details } => details,
                    _ => Payloads::new(),
                };
                let request = RespondActivityTaskCanceledRequest {
                    task_token: task.task_token,
                    details,
                    identity: self.config.identity.clone(),
                };
                let service = self.service.clone();
                let sent = with_retry(&self.call_policy, &self.shutdown, move || {
                    let service = service.clone();
                    let request = request.clone();
                    async move { service.respond_activity_task_canceled(request).await }
                })
                .await;
                if let Err(err) = sent {
                    tracing::warn!(error = %err, "failed to deliver activity cancellation");
                }
            }
            Ok(Ok(Err(err))) => {
                self.respond_failed(&task, encode_error(&err)).await;
            }
        }
    }

    async fn respond_failed(&self, task: &ActivityTask, failure: Failure) {
        let request = RespondActivityTaskFailedRequest {
            task_token: task.task_token,
            failure,
            identity: self.config.identity.clone(),
        };
        let service = self.service.clone();
        let sent = with_retry(&self.call_policy, &self.shutdown, move || {
            let service = service.clone();
            let request = request.clone();
            async move { service.respond_activity_task_failed(request).await }
        })
        .await;
        if let Err(err) = sent {
            tracing::warn!(error = %err, "failed to deliver activity failure");
        }
    }
}

/// An activity panic goes on the wire as an application failure tagged as a
/// panic — retryable, unlike a workflow panic — with the captured backtrace.
fn panic_failure(payload: &(dyn std::any::Any + Send)) -> Failure {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "activity panicked".to_string()
    };
    Failure {
        message,
        source: wl_core::failure::FAILURE_SOURCE.to_string(),
        stack_trace: std::backtrace::Backtrace::force_capture().to_string(),
        cause: None,
        info: FailureInfo::Application {
            error_type: PANIC_ERROR_TYPE.to_string(),
            non_retryable: false,
            details: Payloads::new(),
        },
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
