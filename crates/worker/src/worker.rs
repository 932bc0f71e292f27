// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker assembly and lifecycle.
//!
//! A worker owns its pollers, the sticky cache, and the local-activity
//! executor pool. Construction is cheap and side-effect free; `run` spawns
//! everything and parks until shutdown. Workers are plain values: a process
//! can run any number of them side by side.

use crate::cache::StickyCache;
use crate::config::WorkerConfig;
use crate::local::spawn_local_activity_pool;
use crate::poller::activity::ActivityTaskPoller;
use crate::poller::workflow::{PollCounters, WorkflowTaskPoller};
use crate::registry::{ActivityFn, ActivityRegistry, WorkflowRegistry};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wl_client::{CallPolicy, WorkflowService};
use wl_core::clock::{Clock, SystemClock};
use wl_core::propagator::ContextPropagator;
use wl_engine::WorkflowFn;

pub struct Worker<S, C: Clock = SystemClock> {
    config: Arc<WorkerConfig>,
    service: Arc<S>,
    clock: C,
    workflows: WorkflowRegistry,
    activities: ActivityRegistry,
    propagators: Vec<Arc<dyn ContextPropagator>>,
    cache: Arc<StickyCache>,
    shutdown: CancellationToken,
}

impl<S: WorkflowService> Worker<S, SystemClock> {
    pub fn new(config: WorkerConfig, service: Arc<S>) -> Self {
        Self::with_clock(config, service, SystemClock)
    }
}

impl<S: WorkflowService, C: Clock> Worker<S, C> {
    pub fn with_clock(config: WorkerConfig, service: Arc<S>, clock: C) -> Self {
        let cache = Arc::new(StickyCache::new(config.sticky_cache_size));
        Self {
            config: Arc::new(config),
            service,
            clock,
            workflows: WorkflowRegistry::new(),
            activities: ActivityRegistry::new(),
            propagators: Vec::new(),
            cache,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn register_workflow(&mut self, name: impl Into<String>, f: WorkflowFn) {
        self.workflows.register(name, f);
    }

    pub fn register_activity(&mut self, name: impl Into<String>, f: ActivityFn) {
        self.activities.register(name, f);
    }

    pub fn register_propagator(&mut self, propagator: Arc<dyn ContextPropagator>) {
        self.propagators.push(propagator);
    }

    /// Token observed by every poll loop; cancel it (or call
    /// [`Worker::shutdown`]) to stop the worker.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Run until shutdown. In-flight polls observe cancellation within one
    /// RPC round-trip; processing in flight gets the configured grace
    /// period, then the worker returns regardless.
    pub async fn run(&self) {
        let mut tasks: Vec<JoinHandle<()>> = Vec::new();

        let (tunnel, la_pool) = spawn_local_activity_pool(
            self.activities.clone(),
            self.config.max_concurrent_local_activities,
            self.shutdown.clone(),
        );
        tasks.push(la_pool);

        let counters = Arc::new(Mutex::new(PollCounters::default()));
        for _ in 0..self.config.workflow_pollers {
            let poller = Arc::new(WorkflowTaskPoller {
                service: self.service.clone(),
                config: self.config.clone(),
                workflows: self.workflows.clone(),
                cache: self.cache.clone(),
                tunnel: tunnel.clone(),
                counters: counters.clone(),
                call_policy: CallPolicy::default(),
                shutdown: self.shutdown.clone(),
                clock: self.clock.clone(),
                propagators: Arc::new(self.propagators.clone()),
            });
            tasks.push(tokio::spawn(poller.run()));
        }

        let activity_slots = Arc::new(Semaphore::new(self.config.max_concurrent_activities));
        for _ in 0..self.config.activity_pollers {
            let poller = Arc::new(ActivityTaskPoller {
                service: self.service.clone(),
                config: self.config.clone(),
                activities: self.activities.clone(),
                slots: activity_slots.clone(),
                call_policy: CallPolicy::default(),
                shutdown: self.shutdown.clone(),
            });
            tasks.push(tokio::spawn(poller.run()));
        }

        tracing::info!(
            task_list = %self.config.task_list,
            identity = %self.config.identity,
            workflow_pollers = self.config.workflow_pollers,
            activity_pollers = self.config.activity_pollers,
            "worker started"
        );

        self.shutdown.cancelled().await;
        tracing::info!("worker shutting down");

        let drain = async {
            for task in &mut tasks {
                let _ = task.await;
            }
        };
        if tokio::time::timeout(self.config.shutdown_grace, drain).await.is_err() {
            tracing::warn!(
                grace_ms = self.config.shutdown_grace.as_millis() as u64,
                "grace period expired, aborting remaining tasks"
            );
            for task in &tasks {
                task.abort();
            }
        }

        for run_id in self.cache.drain() {
            tracing::debug!(%run_id, "dropped cached workflow context");
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
