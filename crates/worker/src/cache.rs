// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The sticky workflow cache.
//!
//! Bounded LRU mapping run ID → cached [`WorkflowContext`], guarded by one
//! mutex. Evicting an entry closes its context; the caller is responsible
//! for telling the service via `ResetStickyTaskList` so tasks stop routing
//! to the dead cache line.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::VecDeque;
use wl_core::execution::RunId;
use wl_engine::WorkflowContext;

struct CacheInner {
    capacity: usize,
    entries: HashMap<RunId, WorkflowContext>,
    /// Most recently used at the back.
    lru: VecDeque<RunId>,
}

pub struct StickyCache {
    inner: Mutex<CacheInner>,
}

impl StickyCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                capacity,
                entries: HashMap::new(),
                lru: VecDeque::new(),
            }),
        }
    }

    /// Remove and return the cached context for `run_id`, marking it in use.
    ///
    /// The caller owns the context for the duration of one workflow task and
    /// puts it back (or drops it) when done.
    pub fn take(&self, run_id: &RunId) -> Option<WorkflowContext> {
        let mut inner = self.inner.lock();
        let ctx = inner.entries.remove(run_id)?;
        inner.lru.retain(|id| id != run_id);
        Some(ctx)
    }

    /// Insert (or return) a context. Returns the run IDs evicted to make
    /// room; their contexts have been closed already.
    pub fn put(&self, run_id: RunId, ctx: WorkflowContext) -> Vec<RunId> {
        let mut inner = self.inner.lock();
        if inner.capacity == 0 {
            return Vec::new();
        }
        inner.lru.retain(|id| id != &run_id);
        inner.lru.push_back(run_id.clone());
        inner.entries.insert(run_id, ctx);

        let mut evicted = Vec::new();
        while inner.entries.len() > inner.capacity {
            let Some(victim) = inner.lru.pop_front() else { break };
            if let Some(mut ctx) = inner.entries.remove(&victim) {
                ctx.close();
                evicted.push(victim);
            }
        }
        evicted
    }

    /// Drop a specific entry (after a fatal replay error).
    pub fn evict(&self, run_id: &RunId) {
        let mut inner = self.inner.lock();
        if let Some(mut ctx) = inner.entries.remove(run_id) {
            ctx.close();
        }
        inner.lru.retain(|id| id != run_id);
    }

    /// Close and drop everything (shutdown).
    pub fn drain(&self) -> Vec<RunId> {
        let mut inner = self.inner.lock();
        let ids: Vec<RunId> = inner.lru.drain(..).collect();
        for (_, mut ctx) in inner.entries.drain() {
            ctx.close();
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
