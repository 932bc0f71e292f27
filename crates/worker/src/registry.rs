// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Name → implementation registries.
//!
//! Deliberately minimal: the richer user-facing registration surface lives
//! above this crate. Workers only need to resolve a type name delivered on a
//! task to something runnable.

use crate::poller::activity::ActivityContext;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use wl_core::error::WorkflowError;
use wl_core::payload::Payloads;
use wl_engine::WorkflowFn;

/// Successful activity outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityResult {
    Completed(Payloads),
    /// The activity will be completed asynchronously by an external client;
    /// the worker sends no response for it.
    Pending,
}

type BoxedActivityFuture =
    Pin<Box<dyn Future<Output = Result<ActivityResult, WorkflowError>> + Send + 'static>>;

/// Boxed activity entry point; used for both remote and local activities.
pub type ActivityFn =
    Arc<dyn Fn(ActivityContext, Payloads) -> BoxedActivityFuture + Send + Sync>;

#[derive(Clone, Default)]
pub struct WorkflowRegistry {
    map: HashMap<String, WorkflowFn>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, f: WorkflowFn) {
        self.map.insert(name.into(), f);
    }

    pub fn get(&self, name: &str) -> Option<WorkflowFn> {
        self.map.get(name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct ActivityRegistry {
    map: HashMap<String, ActivityFn>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, f: ActivityFn) {
        self.map.insert(name.into(), f);
    }

    pub fn get(&self, name: &str) -> Option<ActivityFn> {
        self.map.get(name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
