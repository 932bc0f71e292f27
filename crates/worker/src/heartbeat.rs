// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity heartbeat batching.
//!
//! User code may heartbeat far more often than the service wants to hear;
//! the handle buffers the latest details and a background task flushes them
//! on an interval derived from the heartbeat timeout. A flush response with
//! `cancel_requested` cancels the activity's context.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wl_client::WorkflowService;
use wl_core::execution::TaskToken;
use wl_core::payload::Payloads;
use wl_proto::RecordActivityTaskHeartbeatRequest;

/// Fraction of the heartbeat timeout between flushes.
const FLUSH_FRACTION: f64 = 0.8;

/// Buffered heartbeat sender for one activity invocation.
#[derive(Clone)]
pub struct HeartbeatHandle {
    latest: Arc<Mutex<Option<Payloads>>>,
}

impl HeartbeatHandle {
    /// Buffer details for the next flush, replacing any unflushed ones.
    pub fn record(&self, details: Payloads) {
        *self.latest.lock() = Some(details);
    }
}

/// Start the flush loop for one activity. Returns the handle user code
/// heartbeats through and the background task driving flushes.
///
/// The loop exits when `activity_cancel` fires (activity finished or was
/// canceled); a `cancel_requested` response fires that same token.
pub(crate) fn spawn_heartbeat_loop<S: WorkflowService>(
    service: Arc<S>,
    task_token: TaskToken,
    identity: String,
    heartbeat_timeout: Duration,
    activity_cancel: CancellationToken,
) -> (HeartbeatHandle, JoinHandle<()>) {
    let handle = HeartbeatHandle { latest: Arc::new(Mutex::new(None)) };
    let latest = handle.latest.clone();
    let interval = heartbeat_timeout.mul_f64(FLUSH_FRACTION).max(Duration::from_millis(100));

    let join = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = activity_cancel.cancelled() => return,
                _ = tokio::time::sleep(interval) => {}
            }
            let details = match latest.lock().take() {
                Some(details) => details,
                None => continue,
            };
            let request = RecordActivityTaskHeartbeatRequest {
                task_token,
                details,
                identity: identity.clone(),
            };
            match service.record_activity_task_heartbeat(request).await {
                Ok(response) if response.cancel_requested => {
                    tracing::info!(%task_token, "service requested activity cancellation");
                    activity_cancel.cancel();
                    return;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%task_token, error = %err, "heartbeat delivery failed");
                }
            }
        }
    });
    (handle, join)
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
