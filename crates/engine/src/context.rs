// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-execution workflow state shared between the replay driver and the
//! workflow API surface.
//!
//! The core is a plain mutex-guarded struct: the replay driver locks it to
//! apply events and settle futures, releases it, then runs the dispatcher;
//! workflow code locks it briefly inside each [`crate::WfApi`] call. Neither
//! side holds the lock across a coroutine poll.

use crate::local::LocalActivityRequest;
use std::collections::HashMap;
use std::time::Duration;
use wl_core::clock::SimClock;
use wl_core::error::WorkflowError;
use wl_core::execution::WorkflowExecution;
use wl_core::failure::{encode_error, Failure};
use wl_core::id::SeqIdGen;
use wl_core::payload::Payloads;
use wl_dispatch::{CancelScope, Settable, WfChannel};
use wl_machines::{MachineError, MachineOutcome, MachineRegistry, WakeHandle};
use wl_proto::Decision;

/// Immutable facts about the execution being replayed.
#[derive(Debug, Clone)]
pub struct WorkflowInfo {
    pub namespace: String,
    pub execution: WorkflowExecution,
    pub workflow_type: String,
    pub task_list: String,
    pub attempt: u32,
    pub workflow_task_timeout: Duration,
}

/// Result of one workflow function run.
pub type WorkflowResult = Result<Payloads, WorkflowError>;

/// Capacity of per-name signal channels. Signals beyond this park the
/// delivery until the workflow drains; history order is preserved.
pub(crate) const SIGNAL_CHANNEL_CAPACITY: usize = 1024;

pub(crate) type QueryHandler =
    Box<dyn Fn(Payloads) -> Result<Payloads, WorkflowError> + Send + 'static>;

/// A recorded marker, stashed ahead of the turn that will consume it.
#[derive(Debug, Clone)]
pub(crate) struct RecordedMarker {
    pub details: Payloads,
    pub failure: Option<Failure>,
}

/// Bookkeeping for one in-flight local activity.
pub(crate) struct PendingLocalActivity {
    pub handle: WakeHandle,
    pub request: LocalActivityRequest,
}

pub(crate) struct ContextCore {
    pub info: WorkflowInfo,
    pub registry: MachineRegistry,
    /// Arena of futures machines will complete, keyed by integer handle.
    arena: HashMap<u64, Settable<MachineOutcome>>,
    next_handle: u64,
    /// Deterministic counter for generated correlation IDs.
    pub seq: SeqIdGen,
    /// Simulated time, advanced at each `task:started` boundary.
    pub sim: SimClock,
    /// True while processing turns the service has already seen.
    pub replaying: bool,
    /// Versions recorded by `version` markers, by change ID.
    pub version_map: HashMap<String, i32>,
    /// Side-effect and mutable-side-effect markers, by marker ID.
    pub recorded_side_effects: HashMap<String, RecordedMarker>,
    /// Mutable side effects also index their latest value by logical ID.
    pub mutable_values: HashMap<String, Payloads>,
    /// Local-activity markers, by marker ID.
    pub recorded_local_results: HashMap<String, RecordedMarker>,
    /// Local activities awaiting dispatch this turn.
    pub pending_la_requests: Vec<LocalActivityRequest>,
    /// In-flight local activities by marker ID.
    pub inflight_la: HashMap<String, PendingLocalActivity>,
    pub signals: HashMap<String, WfChannel<Payloads>>,
    pub query_handlers: HashMap<String, QueryHandler>,
    /// Search-attribute overlay (base attributes are server-held).
    pub search_attrs: HashMap<String, serde_json::Value>,
    /// Values extracted from the start header by context propagators.
    pub propagated: HashMap<String, String>,
    pub root_scope: CancelScope,
    pub cancel_requested: bool,
    /// Staged continue-as-new; wins over the function's return value.
    pub pending_continue: Option<Decision>,
    /// First fatal bookkeeping error raised from inside workflow code.
    pub fatal: Option<MachineError>,
    /// Set once the workflow function returned.
    pub finished: bool,
}

impl ContextCore {
    pub fn new(info: WorkflowInfo) -> Self {
        Self {
            info,
            registry: MachineRegistry::new(),
            arena: HashMap::new(),
            next_handle: 1,
            seq: SeqIdGen::new(),
            sim: SimClock::default(),
            replaying: false,
            version_map: HashMap::new(),
            recorded_side_effects: HashMap::new(),
            mutable_values: HashMap::new(),
            recorded_local_results: HashMap::new(),
            pending_la_requests: Vec::new(),
            inflight_la: HashMap::new(),
            signals: HashMap::new(),
            query_handlers: HashMap::new(),
            search_attrs: HashMap::new(),
            propagated: HashMap::new(),
            root_scope: CancelScope::root(),
            cancel_requested: false,
            pending_continue: None,
            fatal: None,
            finished: false,
        }
    }

    /// Register a settable in the arena; machines reference it by handle.
    pub fn register_handle(&mut self, settable: Settable<MachineOutcome>) -> WakeHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.arena.insert(handle, settable);
        WakeHandle(handle)
    }

    /// Settle and drop the future behind `handle`.
    pub fn resolve_handle(&mut self, handle: WakeHandle, outcome: MachineOutcome) {
        if let Some(settable) = self.arena.remove(&handle.0) {
            settable.settle(outcome);
        } else {
            tracing::warn!(handle = handle.0, "resolution for unknown handle dropped");
        }
    }

    /// Record a fatal bookkeeping error raised from workflow code. The first
    /// one wins; the replay driver surfaces it after the current tick.
    pub fn record_fatal(&mut self, err: MachineError) {
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
    }

    pub fn signal_channel(&mut self, name: &str) -> WfChannel<Payloads> {
        self.signals
            .entry(name.to_string())
            .or_insert_with(|| WfChannel::bounded(SIGNAL_CHANNEL_CAPACITY))
            .clone()
    }

    /// Stage a local activity for dispatch through the tunnel.
    pub fn enqueue_local_activity(
        &mut self,
        handle: WakeHandle,
        request: LocalActivityRequest,
    ) {
        self.inflight_la.insert(
            request.marker_id.clone(),
            PendingLocalActivity { handle, request: request.clone() },
        );
        self.pending_la_requests.push(request);
    }

    /// Record the workflow function's outcome as the terminal decision.
    pub fn record_outcome(&mut self, result: WorkflowResult) {
        self.finished = true;
        if let Some(continue_as_new) = self.pending_continue.take() {
            self.registry.set_terminal_decision(continue_as_new);
            return;
        }
        let decision = match result {
            Ok(result) => Decision::CompleteWorkflow { result },
            Err(err) if err.is_canceled() => {
                let details = match err {
                    WorkflowError::Canceled { details } => details,
                    _ => Payloads::new(),
                };
                Decision::CancelWorkflow { details }
            }
            Err(err) => Decision::FailWorkflow { failure: encode_error(&err) },
        };
        self.registry.set_terminal_decision(decision);
    }
}
