// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow-facing API surface.
//!
//! Every method translates a user intent into a machine-registry operation
//! plus a dispatcher future, so workflow code stays oblivious to replay.
//! Bookkeeping failures raised in here (duplicate IDs, impossible
//! transitions) are recorded as fatal on the context and the returned future
//! never resolves; the replay driver aborts the task after the current tick.

use crate::context::{ContextCore, WorkflowInfo, WorkflowResult};
use crate::local::LocalActivityRequest;
use parking_lot::Mutex;
use wl_core::IdGen;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use wl_core::error::WorkflowError;
use wl_core::failure::decode_failure;
use wl_core::payload::Payloads;
use wl_core::propagator::{ContextPropagator, Header};
use wl_core::retry::{RetryPolicy, RetryState};
use wl_dispatch::{future, CancelScope, Dispatcher, WfChannel, WfFuture};
use wl_machines::MachineOutcome;
use wl_proto::{Decision, MARKER_MUTABLE_SIDE_EFFECT, MARKER_SIDE_EFFECT, MARKER_VERSION};

/// Version returned on replay for a change ID that predates its marker.
pub const DEFAULT_VERSION: i32 = -1;

/// Boxed workflow entry point.
pub type WorkflowFn = Arc<
    dyn Fn(WfApi, Payloads) -> Pin<Box<dyn Future<Output = WorkflowResult> + Send + 'static>>
        + Send
        + Sync,
>;

/// Options for scheduling a (remote) activity.
#[derive(Debug, Clone)]
pub struct ActivityOptions {
    pub activity_type: String,
    pub input: Payloads,
    pub task_list: Option<String>,
    pub activity_id: Option<String>,
    pub schedule_to_close: Option<Duration>,
    pub schedule_to_start: Option<Duration>,
    pub start_to_close: Duration,
    pub heartbeat_timeout: Option<Duration>,
    pub retry_policy: Option<RetryPolicy>,
}

impl ActivityOptions {
    pub fn new(activity_type: impl Into<String>, input: Payloads) -> Self {
        Self {
            activity_type: activity_type.into(),
            input,
            task_list: None,
            activity_id: None,
            schedule_to_close: None,
            schedule_to_start: None,
            start_to_close: Duration::from_secs(10),
            heartbeat_timeout: None,
            retry_policy: None,
        }
    }

    wl_core::setters! {
        set {
            start_to_close: Duration,
        }
        option {
            task_list: String,
            activity_id: String,
            schedule_to_close: Duration,
            schedule_to_start: Duration,
            heartbeat_timeout: Duration,
            retry_policy: RetryPolicy,
        }
    }
}

/// Options for an in-process local activity.
#[derive(Debug, Clone)]
pub struct LocalActivityOptions {
    pub activity_type: String,
    pub input: Payloads,
    pub schedule_to_close: Option<Duration>,
    pub start_to_close: Option<Duration>,
    pub retry_policy: Option<RetryPolicy>,
}

impl LocalActivityOptions {
    pub fn new(activity_type: impl Into<String>, input: Payloads) -> Self {
        Self {
            activity_type: activity_type.into(),
            input,
            schedule_to_close: None,
            start_to_close: None,
            retry_policy: None,
        }
    }

    wl_core::setters! {
        option {
            schedule_to_close: Duration,
            start_to_close: Duration,
            retry_policy: RetryPolicy,
        }
    }
}

/// Options for starting a child workflow.
#[derive(Debug, Clone)]
pub struct ChildWorkflowOptions {
    pub workflow_type: String,
    pub input: Payloads,
    pub workflow_id: Option<String>,
    pub task_list: Option<String>,
    pub execution_timeout: Option<Duration>,
    pub retry_policy: Option<RetryPolicy>,
}

impl ChildWorkflowOptions {
    pub fn new(workflow_type: impl Into<String>, input: Payloads) -> Self {
        Self {
            workflow_type: workflow_type.into(),
            input,
            workflow_id: None,
            task_list: None,
            execution_timeout: None,
            retry_policy: None,
        }
    }

    wl_core::setters! {
        option {
            workflow_id: String,
            task_list: String,
            execution_timeout: Duration,
            retry_policy: RetryPolicy,
        }
    }
}

/// Options for closing the run and continuing as a fresh one.
#[derive(Debug, Clone)]
pub struct ContinueAsNewOptions {
    pub workflow_type: Option<String>,
    pub input: Payloads,
    pub task_list: Option<String>,
}

impl ContinueAsNewOptions {
    pub fn new(input: Payloads) -> Self {
        Self { workflow_type: None, input, task_list: None }
    }

    wl_core::setters! {
        option {
            workflow_type: String,
            task_list: String,
        }
    }
}

/// Handle workflow code uses for every external interaction.
///
/// Cheap to clone; clones share the execution's context and scope tree.
#[derive(Clone)]
pub struct WfApi {
    pub(crate) core: Arc<Mutex<ContextCore>>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) scope: CancelScope,
    pub(crate) propagators: Arc<Vec<Arc<dyn ContextPropagator>>>,
}

impl WfApi {
    /// Immutable facts about this execution.
    pub fn info(&self) -> WorkflowInfo {
        self.core.lock().info.clone()
    }

    /// Current simulated time in epoch milliseconds. Advances only at
    /// workflow-task boundaries; never reads the wall clock.
    pub fn now_ms(&self) -> u64 {
        self.core.lock().sim.now_ms()
    }

    /// True while re-executing turns the service has already seen.
    pub fn is_replaying(&self) -> bool {
        self.core.lock().replaying
    }

    /// Deterministic ID from the per-workflow counter.
    pub fn next_id(&self) -> String {
        self.core.lock().seq.next_id()
    }

    /// Spawn a coroutine sharing this API's scope.
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.dispatcher.spawn(fut);
    }

    /// A clone of this API bound to a child cancel scope.
    pub fn with_child_scope(&self) -> (WfApi, CancelScope) {
        let scope = self.scope.child();
        let api = WfApi { scope: scope.clone(), ..self.clone() };
        (api, scope)
    }

    /// Resolves when this API's scope is canceled.
    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
        self.scope.canceled()
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.core.lock().cancel_requested
    }

    // ---- timers --------------------------------------------------------

    /// Durable timer. Resolves `Ok(())` on fire, `Err(Canceled)` when the
    /// surrounding scope cancels first.
    pub fn timer(&self, duration: Duration) -> impl Future<Output = Result<(), WorkflowError>> {
        let (op, timer_id) = {
            let mut core = self.core.lock();
            let timer_id = wl_core::execution::TimerId::new(core.seq.next_id());
            let (settable, fut) = future();
            let handle = core.register_handle(settable);
            if let Err(err) = core.registry.start_timer(
                timer_id.clone(),
                duration.as_millis() as u64,
                Some(handle),
            ) {
                core.record_fatal(err);
                return OpResult::Stuck;
            }
            (fut, timer_id)
        };
        let core = self.core.clone();
        let scoped = ScopedOp::new(op, self.scope.clone(), move || {
            let mut core = core.lock();
            match core.registry.cancel_timer(&timer_id) {
                Ok(Some(resolution)) => core.resolve_handle(resolution.handle, resolution.outcome),
                Ok(None) => {}
                Err(err) => core.record_fatal(err),
            }
        });
        OpResult::Op(Box::pin(async move {
            match scoped.await {
                MachineOutcome::Fired => Ok(()),
                MachineOutcome::Canceled { .. } => Err(WorkflowError::canceled()),
                other => Err(unexpected_outcome("timer", &other)),
            }
        }))
    }

    // ---- activities ----------------------------------------------------

    /// Schedule an activity on the service and await its outcome.
    pub fn activity(
        &self,
        opts: ActivityOptions,
    ) -> impl Future<Output = Result<Payloads, WorkflowError>> {
        let header = self.build_header();
        let (op, activity_id, activity_type) = {
            let mut core = self.core.lock();
            let id = opts.activity_id.clone().unwrap_or_else(|| core.seq.next_id());
            let activity_id = wl_core::execution::ActivityId::new(id);
            let decision = Decision::ScheduleActivity {
                activity_id: activity_id.clone(),
                activity_type: opts.activity_type.clone(),
                task_list: opts.task_list.clone().unwrap_or_else(|| core.info.task_list.clone()),
                input: opts.input.clone(),
                schedule_to_close_ms: opts.schedule_to_close.map(|d| d.as_millis() as u64),
                schedule_to_start_ms: opts.schedule_to_start.map(|d| d.as_millis() as u64),
                start_to_close_ms: opts.start_to_close.as_millis() as u64,
                heartbeat_timeout_ms: opts.heartbeat_timeout.map(|d| d.as_millis() as u64),
                retry_policy: opts.retry_policy.clone(),
                header,
            };
            let (settable, fut) = future();
            let handle = core.register_handle(settable);
            if let Err(err) =
                core.registry.schedule_activity(activity_id.clone(), decision, Some(handle))
            {
                core.record_fatal(err);
                return OpResult::Stuck;
            }
            (fut, activity_id, opts.activity_type.clone())
        };
        let core = self.core.clone();
        let cancel_id = activity_id.clone();
        let scoped = ScopedOp::new(op, self.scope.clone(), move || {
            let mut core = core.lock();
            match core.registry.request_cancel_activity(&cancel_id) {
                Ok(Some(resolution)) => core.resolve_handle(resolution.handle, resolution.outcome),
                Ok(None) => {}
                Err(err) => core.record_fatal(err),
            }
        });
        OpResult::Op(Box::pin(async move {
            match scoped.await {
                MachineOutcome::Completed { result } => Ok(result),
                MachineOutcome::Failed { failure, retry_state } => {
                    Err(activity_error(&activity_type, &activity_id, retry_state, decode_failure(&failure)))
                }
                MachineOutcome::TimedOut { kind, last_heartbeat, retry_state } => {
                    Err(activity_error(
                        &activity_type,
                        &activity_id,
                        retry_state,
                        WorkflowError::Timeout { kind, last_heartbeat, cause: None },
                    ))
                }
                MachineOutcome::Canceled { details } => Err(WorkflowError::Canceled { details }),
                other => Err(unexpected_outcome("activity", &other)),
            }
        }))
    }

    /// Run an activity in-process, memoized into history as a marker.
    pub fn local_activity(
        &self,
        opts: LocalActivityOptions,
    ) -> impl Future<Output = Result<Payloads, WorkflowError>> {
        let mut core = self.core.lock();
        let marker_id = core.seq.next_id();

        // Replay: the marker is already in history; resolve from the stash.
        if let Some(recorded) = core.recorded_local_results.get(&marker_id).cloned() {
            let outcome = match recorded.failure {
                Some(failure) => Err(decode_failure(&failure)),
                None => Ok(recorded.details),
            };
            return OpResult::Ready(outcome);
        }

        let (settable, fut) = future();
        let handle = core.register_handle(settable);
        let request = LocalActivityRequest {
            marker_id: marker_id.clone(),
            activity_type: opts.activity_type,
            input: opts.input,
            attempt: 1,
            schedule_to_close: opts.schedule_to_close,
            start_to_close: opts.start_to_close,
            retry_policy: opts.retry_policy,
            scheduled_at_ms: core.sim.now_ms(),
        };
        core.enqueue_local_activity(handle, request);
        drop(core);

        OpResult::Op(Box::pin(async move {
            match fut.await {
                MachineOutcome::Completed { result } => Ok(result),
                MachineOutcome::Failed { failure, .. } => Err(decode_failure(&failure)),
                MachineOutcome::Canceled { details } => Err(WorkflowError::Canceled { details }),
                other => Err(unexpected_outcome("local activity", &other)),
            }
        }))
    }

    // ---- child workflows and external executions -----------------------

    /// Start a child workflow and await its result.
    pub fn child_workflow(
        &self,
        opts: ChildWorkflowOptions,
    ) -> impl Future<Output = Result<Payloads, WorkflowError>> {
        let header = self.build_header();
        let (op, workflow_id, workflow_type, namespace) = {
            let mut core = self.core.lock();
            let id = opts
                .workflow_id
                .clone()
                .unwrap_or_else(|| format!("{}-child-{}", core.info.execution.workflow_id, core.seq.next_id()));
            let workflow_id = wl_core::execution::WorkflowId::new(id);
            let decision = Decision::StartChildWorkflow {
                workflow_id: workflow_id.clone(),
                workflow_type: opts.workflow_type.clone(),
                task_list: opts.task_list.clone().unwrap_or_else(|| core.info.task_list.clone()),
                input: opts.input.clone(),
                execution_timeout_ms: opts.execution_timeout.map(|d| d.as_millis() as u64),
                retry_policy: opts.retry_policy.clone(),
                header,
            };
            let (settable, fut) = future();
            let handle = core.register_handle(settable);
            if let Err(err) =
                core.registry.start_child_workflow(workflow_id.clone(), decision, Some(handle))
            {
                core.record_fatal(err);
                return OpResult::Stuck;
            }
            (fut, workflow_id, opts.workflow_type.clone(), core.info.namespace.clone())
        };
        let core = self.core.clone();
        let cancel_id = workflow_id.clone();
        let scoped = ScopedOp::new(op, self.scope.clone(), move || {
            let mut core = core.lock();
            match core.registry.request_cancel_child(&cancel_id) {
                Ok(Some(resolution)) => core.resolve_handle(resolution.handle, resolution.outcome),
                Ok(None) => {}
                Err(err) => core.record_fatal(err),
            }
        });
        OpResult::Op(Box::pin(async move {
            match scoped.await {
                MachineOutcome::Completed { result } => Ok(result),
                MachineOutcome::Failed { failure, retry_state } => Err(child_error(
                    &namespace,
                    &workflow_id,
                    &workflow_type,
                    retry_state,
                    decode_failure(&failure),
                )),
                MachineOutcome::TimedOut { kind, retry_state, .. } => Err(child_error(
                    &namespace,
                    &workflow_id,
                    &workflow_type,
                    retry_state,
                    WorkflowError::timeout(kind),
                )),
                MachineOutcome::Terminated => Err(child_error(
                    &namespace,
                    &workflow_id,
                    &workflow_type,
                    RetryState::NonRetryableFailure,
                    WorkflowError::Terminated { reason: String::new() },
                )),
                MachineOutcome::Canceled { details } => Err(WorkflowError::Canceled { details }),
                other => Err(unexpected_outcome("child workflow", &other)),
            }
        }))
    }

    /// Request cancellation of an unrelated workflow execution.
    pub fn request_cancel_external(
        &self,
        workflow_id: impl Into<String>,
        run_id: Option<wl_core::execution::RunId>,
    ) -> impl Future<Output = Result<(), WorkflowError>> {
        let mut core = self.core.lock();
        let cancel_id = core.seq.next_id();
        let decision = Decision::RequestCancelExternalWorkflow {
            cancel_id: cancel_id.clone(),
            workflow_id: wl_core::execution::WorkflowId::new(workflow_id),
            run_id,
        };
        let (settable, fut) = future();
        let handle = core.register_handle(settable);
        if let Err(err) = core.registry.request_cancel_external(cancel_id, decision, Some(handle)) {
            core.record_fatal(err);
            return OpResult::Stuck;
        }
        drop(core);
        OpResult::Op(Box::pin(async move { delivery_result(fut.await) }))
    }

    /// Signal an unrelated workflow execution.
    pub fn signal_external(
        &self,
        workflow_id: impl Into<String>,
        run_id: Option<wl_core::execution::RunId>,
        signal_name: impl Into<String>,
        input: Payloads,
    ) -> impl Future<Output = Result<(), WorkflowError>> {
        let header = self.build_header();
        let mut core = self.core.lock();
        let signal_id = core.seq.next_id();
        let decision = Decision::SignalExternalWorkflow {
            signal_id: signal_id.clone(),
            workflow_id: wl_core::execution::WorkflowId::new(workflow_id),
            run_id,
            signal_name: signal_name.into(),
            input,
            header,
        };
        let (settable, fut) = future();
        let handle = core.register_handle(settable);
        if let Err(err) = core.registry.signal_external(signal_id, decision, Some(handle)) {
            core.record_fatal(err);
            return OpResult::Stuck;
        }
        drop(core);
        OpResult::Op(Box::pin(async move { delivery_result(fut.await) }))
    }

    // ---- markers -------------------------------------------------------

    /// Execute `f` once and memoize its value into history; replays return
    /// the recorded value without re-executing.
    pub fn side_effect(
        &self,
        f: impl FnOnce() -> serde_json::Value,
    ) -> Result<Payloads, WorkflowError> {
        let mut core = self.core.lock();
        let marker_id = core.seq.next_id();
        if let Some(recorded) = core.recorded_side_effects.get(&marker_id) {
            return Ok(recorded.details.clone());
        }
        let details = Payloads::single(&f())
            .map_err(|e| WorkflowError::application(format!("side effect encode: {e}")))?;
        let decision = Decision::RecordMarker {
            marker_name: MARKER_SIDE_EFFECT.to_string(),
            marker_id: marker_id.clone(),
            details: details.clone(),
            failure: None,
        };
        if let Err(err) = core.registry.record_marker(marker_id, decision) {
            core.record_fatal(err);
        }
        Ok(details)
    }

    /// Like [`WfApi::side_effect`], but re-records only when the produced
    /// value differs from the last recorded one for `id`.
    pub fn mutable_side_effect(
        &self,
        id: &str,
        f: impl FnOnce() -> serde_json::Value,
    ) -> Result<Payloads, WorkflowError> {
        let mut core = self.core.lock();
        let occurrence = core.seq.next_seq();
        let marker_id = format!("{id}#{occurrence}");

        if let Some(recorded) = core.recorded_side_effects.get(&marker_id).cloned() {
            core.mutable_values.insert(id.to_string(), recorded.details.clone());
            return Ok(recorded.details);
        }

        let details = Payloads::single(&f())
            .map_err(|e| WorkflowError::application(format!("side effect encode: {e}")))?;
        if core.mutable_values.get(id) == Some(&details) {
            return Ok(details);
        }
        let decision = Decision::RecordMarker {
            marker_name: MARKER_MUTABLE_SIDE_EFFECT.to_string(),
            marker_id: marker_id.clone(),
            details: details.clone(),
            failure: None,
        };
        if let Err(err) = core.registry.record_marker(marker_id, decision) {
            core.record_fatal(err);
        }
        core.mutable_values.insert(id.to_string(), details.clone());
        Ok(details)
    }

    /// Version gate for workflow-code changes.
    ///
    /// First execution chooses `max` and records it; replays return the
    /// recorded version, or [`DEFAULT_VERSION`] for histories that predate
    /// the change.
    pub fn get_version(&self, change_id: &str, min: i32, max: i32) -> Result<i32, WorkflowError> {
        let mut core = self.core.lock();
        if let Some(&version) = core.version_map.get(change_id) {
            if version < min || version > max {
                return Err(WorkflowError::application(format!(
                    "recorded version {version} for {change_id:?} outside [{min}, {max}]"
                )));
            }
            return Ok(version);
        }
        if core.replaying {
            // Pre-change history: behave like code before the patch.
            core.version_map.insert(change_id.to_string(), DEFAULT_VERSION);
            if min > DEFAULT_VERSION {
                return Err(WorkflowError::application(format!(
                    "history predates change {change_id:?} but min version is {min}"
                )));
            }
            return Ok(DEFAULT_VERSION);
        }
        let details = Payloads::single(&serde_json::json!({
            "change_id": change_id,
            "version": max,
        }))
        .map_err(|e| WorkflowError::application(format!("version encode: {e}")))?;
        let decision = Decision::RecordMarker {
            marker_name: MARKER_VERSION.to_string(),
            marker_id: change_id.to_string(),
            details,
            failure: None,
        };
        if let Err(err) = core.registry.record_marker(change_id, decision) {
            core.record_fatal(err);
        }
        core.version_map.insert(change_id.to_string(), max);
        Ok(max)
    }

    /// Merge search attributes into the execution's visibility record.
    pub fn upsert_search_attributes(&self, attrs: HashMap<String, serde_json::Value>) {
        let mut core = self.core.lock();
        let upsert_id = core.seq.next_id();
        for (k, v) in &attrs {
            core.search_attrs.insert(k.clone(), v.clone());
        }
        let decision = Decision::UpsertSearchAttributes { attrs };
        if let Err(err) = core.registry.upsert_search_attributes(upsert_id, decision) {
            core.record_fatal(err);
        }
    }

    // ---- signals, queries, completion ----------------------------------

    /// Channel receiving payloads of the named signal, in history order.
    pub fn signal_channel(&self, name: &str) -> WfChannel<Payloads> {
        self.core.lock().signal_channel(name)
    }

    /// Register a query handler. Handlers must be read-only and fast; they
    /// run outside the dispatcher.
    pub fn set_query_handler(
        &self,
        name: &str,
        handler: impl Fn(Payloads) -> Result<Payloads, WorkflowError> + Send + 'static,
    ) {
        self.core.lock().query_handlers.insert(name.to_string(), Box::new(handler));
    }

    /// Close this run and continue as a fresh one. Takes effect when the
    /// workflow function returns.
    pub fn continue_as_new(&self, opts: ContinueAsNewOptions) {
        let mut core = self.core.lock();
        let workflow_type =
            opts.workflow_type.unwrap_or_else(|| core.info.workflow_type.clone());
        core.pending_continue = Some(Decision::ContinueAsNew {
            workflow_type,
            input: opts.input,
            task_list: opts.task_list,
        });
    }

    // ---- internals -----------------------------------------------------

    fn build_header(&self) -> Header {
        let context = self.core.lock().propagated.clone();
        let mut header = Header::new();
        for propagator in self.propagators.iter() {
            propagator.inject(&context, &mut header);
        }
        header
    }
}

/// Future returned by intent methods.
///
/// `Stuck` is the fatal-error arm: the context already recorded the error
/// and the replay driver will abort the task, so the future simply never
/// resolves.
enum OpResult<T> {
    Op(Pin<Box<dyn Future<Output = T> + Send + 'static>>),
    Ready(T),
    Stuck,
}

impl<T: Unpin> Future for OpResult<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        match this {
            OpResult::Op(fut) => fut.as_mut().poll(cx),
            OpResult::Stuck => Poll::Pending,
            OpResult::Ready(_) => match std::mem::replace(this, OpResult::Stuck) {
                OpResult::Ready(value) => Poll::Ready(value),
                _ => Poll::Pending,
            },
        }
    }
}

/// Couples an operation future to a cancel scope: the first poll after the
/// scope cancels fires `cancel_fn` (which sends the local cancel intent),
/// then keeps driving the operation to whatever outcome the machine reports.
struct ScopedOp {
    op: WfFuture<MachineOutcome>,
    watch: Option<wl_dispatch::CancelScope>,
    cancel_fn: Option<Box<dyn FnOnce() + Send>>,
}

impl ScopedOp {
    fn new(
        op: WfFuture<MachineOutcome>,
        scope: CancelScope,
        cancel_fn: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self { op, watch: Some(scope), cancel_fn: Some(Box::new(cancel_fn)) }
    }
}

impl Future for ScopedOp {
    type Output = MachineOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<MachineOutcome> {
        let this = self.get_mut();
        if let Some(scope) = &this.watch {
            let mut canceled = scope.canceled();
            if Pin::new(&mut canceled).poll(cx).is_ready() {
                if let Some(cancel_fn) = this.cancel_fn.take() {
                    cancel_fn();
                }
                this.watch = None;
            }
        }
        Pin::new(&mut this.op).poll(cx)
    }
}

fn unexpected_outcome(what: &str, outcome: &MachineOutcome) -> WorkflowError {
    WorkflowError::application(format!("unexpected {what} outcome: {outcome:?}"))
}

fn delivery_result(outcome: MachineOutcome) -> Result<(), WorkflowError> {
    match outcome {
        MachineOutcome::Delivered => Ok(()),
        MachineOutcome::DeliveryFailed { cause } => Err(WorkflowError::application(cause)),
        other => Err(unexpected_outcome("external delivery", &other)),
    }
}

fn activity_error(
    activity_type: &str,
    activity_id: &wl_core::execution::ActivityId,
    retry_state: RetryState,
    cause: WorkflowError,
) -> WorkflowError {
    WorkflowError::Activity {
        scheduled_event_id: 0,
        started_event_id: 0,
        identity: String::new(),
        activity_type: activity_type.to_string(),
        activity_id: activity_id.to_string(),
        retry_state,
        cause: Box::new(cause),
    }
}

fn child_error(
    namespace: &str,
    workflow_id: &wl_core::execution::WorkflowId,
    workflow_type: &str,
    retry_state: RetryState,
    cause: WorkflowError,
) -> WorkflowError {
    WorkflowError::ChildWorkflow {
        namespace: namespace.to_string(),
        execution: wl_core::execution::WorkflowExecution::new(
            workflow_id.as_str(),
            wl_core::execution::RunId::from_string(""),
        ),
        workflow_type: workflow_type.to_string(),
        initiated_event_id: 0,
        started_event_id: 0,
        retry_state,
        cause: Box::new(cause),
    }
}
