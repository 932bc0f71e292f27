// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local activity execution.
//!
//! A bounded tunnel carries requests from workflow task processing into a
//! pool of in-process executors; results flow back to the owning task
//! through a per-task reply channel. Executors run exactly one attempt with
//! a deadline and panic recovery; retry lives on the workflow side.

use crate::poller::activity::ActivityContext;
use crate::registry::{ActivityRegistry, ActivityResult};
use futures_util::FutureExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wl_core::error::{TimeoutKind, WorkflowError, PANIC_ERROR_TYPE};
use wl_core::payload::Payloads;
use wl_engine::{LocalActivityRequest, LocalActivityResult};

/// Tunnel capacity; producers block when the executor pool falls behind.
pub const TUNNEL_CAPACITY: usize = 1000;

/// Deadline applied when a request carries no explicit one.
const DEFAULT_ATTEMPT_DEADLINE: Duration = Duration::from_secs(60);

/// One queued execution: the request plus the reply channel of the workflow
/// task that owns it.
pub(crate) struct LocalActivityJob {
    pub request: LocalActivityRequest,
    pub reply: mpsc::Sender<LocalActivityResult>,
}

/// Producer half handed to workflow task processing.
#[derive(Clone)]
pub struct LocalActivityTunnel {
    tx: mpsc::Sender<LocalActivityJob>,
}

impl LocalActivityTunnel {
    pub(crate) async fn dispatch(
        &self,
        request: LocalActivityRequest,
        reply: mpsc::Sender<LocalActivityResult>,
    ) -> bool {
        self.tx.send(LocalActivityJob { request, reply }).await.is_ok()
    }
}

/// Start the executor pool. Returns the tunnel producer and the consumer
/// task; the consumer exits promptly when `shutdown` fires.
pub(crate) fn spawn_local_activity_pool(
    activities: ActivityRegistry,
    max_concurrent: usize,
    shutdown: CancellationToken,
) -> (LocalActivityTunnel, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<LocalActivityJob>(TUNNEL_CAPACITY);
    let semaphore = Arc::new(Semaphore::new(max_concurrent));

    let consumer_shutdown = shutdown.clone();
    let join = tokio::spawn(async move {
        loop {
            let job = tokio::select! {
                _ = consumer_shutdown.cancelled() => return,
                job = rx.recv() => match job {
                    Some(job) => job,
                    None => return,
                },
            };
            let permit = tokio::select! {
                _ = consumer_shutdown.cancelled() => return,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };
            let activities = activities.clone();
            let shutdown = consumer_shutdown.clone();
            tokio::spawn(async move {
                let _permit = permit;
                run_one_attempt(activities, job, shutdown).await;
            });
        }
    });

    (LocalActivityTunnel { tx }, join)
}

/// Execute a single attempt: deadline, panic recovery, result delivery.
async fn run_one_attempt(
    activities: ActivityRegistry,
    job: LocalActivityJob,
    shutdown: CancellationToken,
) {
    let request = job.request;
    let started = Instant::now();

    let outcome = match activities.get(&request.activity_type) {
        None => Err(WorkflowError::Application {
            message: format!("local activity not registered: {}", request.activity_type),
            error_type: "NotRegisteredError".into(),
            non_retryable: true,
            details: Payloads::new(),
            cause: None,
        }),
        Some(f) => {
            let deadline = request
                .start_to_close
                .or(request.schedule_to_close)
                .unwrap_or(DEFAULT_ATTEMPT_DEADLINE);
            let ctx = ActivityContext::local(request.attempt, shutdown.child_token());
            let fut = f(ctx, request.input.clone());
            match tokio::time::timeout(deadline, std::panic::AssertUnwindSafe(fut).catch_unwind())
                .await
            {
                Err(_elapsed) => Err(WorkflowError::timeout(TimeoutKind::StartToClose)),
                Ok(Err(panic)) => Err(panic_to_error(panic.as_ref())),
                Ok(Ok(Ok(ActivityResult::Completed(result)))) => Ok(result),
                Ok(Ok(Ok(ActivityResult::Pending))) => Err(WorkflowError::application(
                    "local activities cannot complete asynchronously",
                )),
                Ok(Ok(Err(err))) => Err(err),
            }
        }
    };

    let result = LocalActivityResult {
        marker_id: request.marker_id.clone(),
        attempt: request.attempt,
        outcome,
        elapsed: started.elapsed(),
    };
    if job.reply.send(result).await.is_err() {
        tracing::debug!(marker_id = %request.marker_id, "local activity owner gone, result dropped");
    }
}

/// A panic inside a local activity becomes a retryable application failure
/// tagged as a panic, with whatever message the payload carried.
fn panic_to_error(payload: &(dyn std::any::Any + Send)) -> WorkflowError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "local activity panicked".to_string()
    };
    WorkflowError::Application {
        message,
        error_type: PANIC_ERROR_TYPE.into(),
        non_retryable: false,
        details: Payloads::new(),
        cause: None,
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
