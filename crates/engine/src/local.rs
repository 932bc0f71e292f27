// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow-side local activity types.
//!
//! Execution happens in the worker's in-process executor pool; this module
//! only defines what crosses the tunnel. Retry is orchestrated by the
//! workflow task loop (not the executor) using the configured policy, and
//! each final result is materialized into history as a local-activity
//! marker at the next decision flush.

use std::time::Duration;
use wl_core::error::WorkflowError;
use wl_core::payload::Payloads;
use wl_core::retry::RetryPolicy;

/// A request travelling workflow → executor pool.
#[derive(Debug, Clone)]
pub struct LocalActivityRequest {
    /// Correlation ID; doubles as the marker ID recorded into history.
    pub marker_id: String,
    pub activity_type: String,
    pub input: Payloads,
    pub attempt: u32,
    /// Total budget across attempts, measured from first schedule.
    pub schedule_to_close: Option<Duration>,
    /// Per-attempt deadline.
    pub start_to_close: Option<Duration>,
    pub retry_policy: Option<RetryPolicy>,
    /// Simulated time when the first attempt was scheduled.
    pub scheduled_at_ms: u64,
}

/// A result travelling executor pool → workflow.
#[derive(Debug, Clone)]
pub struct LocalActivityResult {
    pub marker_id: String,
    pub attempt: u32,
    pub outcome: Result<Payloads, WorkflowError>,
    pub elapsed: Duration,
}

/// What the workflow task loop should do with a result.
#[derive(Debug)]
pub enum LocalActivityDisposition {
    /// Final: a marker was recorded and the waiting future resolved.
    Recorded,
    /// Not final: re-dispatch this request after the delay.
    Retry { request: LocalActivityRequest, delay: Duration },
}
