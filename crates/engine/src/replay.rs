// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The replay driver.
//!
//! Walks a task's history delta in order: machine events settle futures,
//! `task:started` advances the simulated clock and runs the dispatcher to
//! the all-blocked fixpoint, `task:completed` opens a fresh decision batch.
//! Marker events are preloaded one turn ahead of the code that recorded
//! them, because the service appends them after the turn's `task:completed`.

use crate::context::{ContextCore, RecordedMarker, WorkflowInfo};
use crate::error::ReplayError;
use crate::local::{LocalActivityDisposition, LocalActivityRequest, LocalActivityResult};
use crate::workflow::{WfApi, WorkflowFn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use wl_core::failure::encode_error;
use wl_core::payload::Payloads;
use wl_core::propagator::ContextPropagator;
use wl_dispatch::{DispatchError, Dispatcher, TickStatus};
use wl_machines::{MachineOutcome, MachineResolution};
use wl_proto::{
    Decision, EventAttrs, HistoryEvent, HistoryWindow, WorkflowQuery, MARKER_LOCAL_ACTIVITY,
    MARKER_MUTABLE_SIDE_EFFECT, MARKER_SIDE_EFFECT, MARKER_VERSION,
};

/// What one processing pass produced.
#[derive(Debug, Default)]
pub struct TurnOutput {
    pub decisions: Vec<Decision>,
    /// True when the dispatcher yielded on the caller's budget; the poller
    /// must respond with `force_create_new_task` and continue on the
    /// follow-up task.
    pub budget_exceeded: bool,
}

/// One cached workflow execution: context core, dispatcher, and the user
/// workflow function driving it.
pub struct WorkflowContext {
    core: Arc<Mutex<ContextCore>>,
    dispatcher: Dispatcher,
    workflow_fn: WorkflowFn,
    propagators: Arc<Vec<Arc<dyn ContextPropagator>>>,
    started: bool,
    last_processed_event_id: i64,
}

impl WorkflowContext {
    pub fn new(
        info: WorkflowInfo,
        workflow_fn: WorkflowFn,
        propagators: Vec<Arc<dyn ContextPropagator>>,
    ) -> Self {
        Self {
            core: Arc::new(Mutex::new(ContextCore::new(info))),
            dispatcher: Dispatcher::new(),
            workflow_fn,
            propagators: Arc::new(propagators),
            started: false,
            last_processed_event_id: 0,
        }
    }

    /// Highest event ID this context has processed; a sticky cache hit feeds
    /// only events above it.
    pub fn last_processed_event_id(&self) -> i64 {
        self.last_processed_event_id
    }

    pub fn workflow_closed(&self) -> bool {
        self.core.lock().registry.workflow_closed()
    }

    /// Cancel everything on eviction; the context is unusable afterwards.
    pub fn close(&mut self) {
        self.core.lock().root_scope.cancel();
    }

    /// Process a slice of history events.
    ///
    /// `previous_started_event_id` marks the replay boundary;
    /// `should_yield` is consulted between coroutine polls of the live turn
    /// (the heartbeat cutoff).
    pub fn process_events(
        &mut self,
        events: &[HistoryEvent],
        previous_started_event_id: i64,
        should_yield: &mut (dyn FnMut() -> bool + Send),
    ) -> Result<TurnOutput, ReplayError> {
        let mut output = TurnOutput::default();
        let window = HistoryWindow::new(events, previous_started_event_id);
        let last_started_id = window.last_started_event_id();

        for (idx, event) in events.iter().enumerate() {
            self.last_processed_event_id = self.last_processed_event_id.max(event.event_id);
            match &event.attrs {
                EventAttrs::WorkflowStarted { input, header, workflow_task_timeout_ms, .. } => {
                    self.on_workflow_started(input.clone(), header, *workflow_task_timeout_ms);
                }
                EventAttrs::WorkflowTaskStarted {} => {
                    let live = event.event_id >= last_started_id && !window.is_replay(event);
                    {
                        let mut core = self.core.lock();
                        core.sim.advance_to(event.timestamp_ms);
                        core.replaying = !live;
                    }
                    self.preload_markers(&events[idx + 1..]);

                    let status = if live {
                        self.tick(Some(&mut *should_yield))?
                    } else {
                        self.tick(None)?
                    };
                    let decisions = self.core.lock().registry.take_decisions();
                    if live {
                        output.decisions = decisions;
                        output.budget_exceeded = status == TickStatus::BudgetExceeded;
                    }
                    // Replayed batches were already accepted by the service;
                    // nothing to compare them against here (determinism
                    // checks are out of scope), so they are dropped.
                }
                EventAttrs::WorkflowTaskCompleted {} => {}
                EventAttrs::SignalReceived { signal_name, input } => {
                    let chan = self.core.lock().signal_channel(signal_name);
                    if chan.try_send(input.clone()).is_err() {
                        tracing::warn!(signal = %signal_name, "signal buffer full, dropped");
                    }
                }
                EventAttrs::CancelRequested {} => {
                    let scope = {
                        let mut core = self.core.lock();
                        core.cancel_requested = true;
                        core.root_scope.clone()
                    };
                    scope.cancel();
                }
                EventAttrs::MarkerRecorded { marker_name, marker_id, details, failure } => {
                    self.stash_marker(marker_name, marker_id, details, failure.as_ref());
                    let resolutions = self.core.lock().registry.handle_event(event)?;
                    self.settle(resolutions);
                }
                EventAttrs::SearchAttributesUpserted { attrs } => {
                    let mut core = self.core.lock();
                    for (k, v) in attrs {
                        core.search_attrs.insert(k.clone(), v.clone());
                    }
                }
                _ => {
                    let resolutions = self.core.lock().registry.handle_event(event)?;
                    self.settle(resolutions);
                }
            }
        }
        Ok(output)
    }

    /// Drain local activities staged by the last tick.
    pub fn take_pending_local_activities(&mut self) -> Vec<LocalActivityRequest> {
        std::mem::take(&mut self.core.lock().pending_la_requests)
    }

    /// Feed one local activity result back into the workflow.
    ///
    /// Final results are recorded as a marker and resolve the waiting
    /// future; retryable failures hand the next attempt back to the caller.
    pub fn apply_local_activity_result(
        &mut self,
        result: LocalActivityResult,
    ) -> Result<LocalActivityDisposition, ReplayError> {
        let mut core = self.core.lock();
        let pending = core
            .inflight_la
            .get(&result.marker_id)
            .ok_or_else(|| ReplayError::UnknownLocalActivity { marker_id: result.marker_id.clone() })?;

        if let Err(err) = &result.outcome {
            if let Some(policy) = pending.request.retry_policy.clone() {
                match policy.next_attempt(
                    result.attempt,
                    err,
                    result.elapsed,
                    pending.request.schedule_to_close,
                ) {
                    wl_core::retry::RetryDecision::Retry { delay } => {
                        let mut request = pending.request.clone();
                        request.attempt = result.attempt + 1;
                        return Ok(LocalActivityDisposition::Retry { request, delay });
                    }
                    wl_core::retry::RetryDecision::Stop { state } => {
                        drop(core);
                        self.record_local_result(&result, state)?;
                        return Ok(LocalActivityDisposition::Recorded);
                    }
                }
            }
        }
        drop(core);
        self.record_local_result(&result, wl_core::retry::RetryState::InProgress)?;
        Ok(LocalActivityDisposition::Recorded)
    }

    /// Tick to the fixpoint and flush decisions (used after local-activity
    /// results and heartbeat continuations).
    pub fn run_and_flush(
        &mut self,
        should_yield: &mut (dyn FnMut() -> bool + Send),
    ) -> Result<TurnOutput, ReplayError> {
        let status = self.tick(Some(should_yield))?;
        Ok(TurnOutput {
            decisions: self.core.lock().registry.take_decisions(),
            budget_exceeded: status == TickStatus::BudgetExceeded,
        })
    }

    /// Answer a query against the current context state.
    pub fn handle_query(
        &self,
        query: &WorkflowQuery,
    ) -> Result<Payloads, wl_core::error::WorkflowError> {
        let core = self.core.lock();
        match core.query_handlers.get(&query.query_type) {
            Some(handler) => handler(query.args.clone()),
            None => Err(wl_core::error::WorkflowError::application(format!(
                "unknown query type: {}",
                query.query_type
            ))),
        }
    }

    // ---- internals -----------------------------------------------------

    fn on_workflow_started(
        &mut self,
        input: Payloads,
        header: &HashMap<String, String>,
        workflow_task_timeout_ms: u64,
    ) {
        if self.started {
            return;
        }
        self.started = true;

        let api = {
            let mut core = self.core.lock();
            if workflow_task_timeout_ms > 0 {
                core.info.workflow_task_timeout =
                    std::time::Duration::from_millis(workflow_task_timeout_ms);
            }
            let mut propagated = HashMap::new();
            for propagator in self.propagators.iter() {
                propagator.extract(header, &mut propagated);
            }
            core.propagated = propagated;
            WfApi {
                core: self.core.clone(),
                dispatcher: self.dispatcher.clone(),
                scope: core.root_scope.clone(),
                propagators: self.propagators.clone(),
            }
        };

        let workflow_fn = self.workflow_fn.clone();
        let core = self.core.clone();
        self.dispatcher.spawn(async move {
            let result = workflow_fn(api, input).await;
            core.lock().record_outcome(result);
        });
    }

    fn tick(
        &mut self,
        budget: Option<&mut (dyn FnMut() -> bool + Send)>,
    ) -> Result<TickStatus, ReplayError> {
        let result = match budget {
            Some(should_yield) => self.dispatcher.run_with_budget(should_yield),
            None => self.dispatcher.run_until_all_blocked(),
        };
        let status = result.map_err(|DispatchError::TaskPanicked { message }| {
            ReplayError::Panic { message }
        })?;
        if let Some(fatal) = self.core.lock().fatal.take() {
            return Err(ReplayError::Machine(fatal));
        }
        Ok(status)
    }

    fn settle(&mut self, resolutions: Vec<MachineResolution>) {
        let mut core = self.core.lock();
        for resolution in resolutions {
            core.resolve_handle(resolution.handle, resolution.outcome);
        }
    }

    /// Scan ahead to the next `task:started` and stash markers the turn
    /// about to run will need.
    fn preload_markers(&mut self, upcoming: &[HistoryEvent]) {
        for event in upcoming {
            match &event.attrs {
                EventAttrs::WorkflowTaskStarted {} => break,
                EventAttrs::MarkerRecorded { marker_name, marker_id, details, failure } => {
                    self.stash_marker(marker_name, marker_id, details, failure.as_ref());
                }
                _ => {}
            }
        }
    }

    fn stash_marker(
        &mut self,
        marker_name: &str,
        marker_id: &str,
        details: &Payloads,
        failure: Option<&wl_core::failure::Failure>,
    ) {
        let mut core = self.core.lock();
        let recorded =
            RecordedMarker { details: details.clone(), failure: failure.cloned() };
        match marker_name {
            MARKER_SIDE_EFFECT | MARKER_MUTABLE_SIDE_EFFECT => {
                core.recorded_side_effects.insert(marker_id.to_string(), recorded);
            }
            MARKER_VERSION => {
                #[derive(serde::Deserialize)]
                struct VersionDetails {
                    change_id: String,
                    version: i32,
                }
                match details.decode_at::<VersionDetails>(0) {
                    Ok(v) => {
                        core.version_map.insert(v.change_id, v.version);
                    }
                    Err(e) => {
                        tracing::warn!(marker_id, error = %e, "undecodable version marker")
                    }
                }
            }
            MARKER_LOCAL_ACTIVITY => {
                core.recorded_local_results.insert(marker_id.to_string(), recorded);
            }
            other => {
                tracing::debug!(marker_name = other, marker_id, "unknown marker kind ignored");
            }
        }
    }

    fn record_local_result(
        &mut self,
        result: &LocalActivityResult,
        retry_state: wl_core::retry::RetryState,
    ) -> Result<(), ReplayError> {
        let mut core = self.core.lock();
        let pending = core
            .inflight_la
            .remove(&result.marker_id)
            .ok_or_else(|| ReplayError::UnknownLocalActivity { marker_id: result.marker_id.clone() })?;

        let (details, failure) = match &result.outcome {
            Ok(payloads) => (payloads.clone(), None),
            Err(err) => (Payloads::new(), Some(encode_error(err))),
        };
        let decision = Decision::RecordMarker {
            marker_name: MARKER_LOCAL_ACTIVITY.to_string(),
            marker_id: result.marker_id.clone(),
            details: details.clone(),
            failure: failure.clone(),
        };
        core.registry.record_marker(result.marker_id.clone(), decision)?;

        let outcome = match failure {
            None => MachineOutcome::Completed { result: details },
            Some(failure) => MachineOutcome::Failed { failure, retry_state },
        };
        core.resolve_handle(pending.handle, outcome);
        Ok(())
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
