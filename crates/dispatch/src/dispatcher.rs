// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coroutine dispatcher.
//!
//! One logical execution context: at any instant at most one coroutine runs.
//! The ready queue is strict FIFO; spawns enqueue at the tail, wakes enqueue
//! at the tail in settle order. Given identical history (and therefore
//! identical settle order), resumption order is identical.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll, Wake, Waker};
use thiserror::Error;

/// Identifier of a spawned coroutine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// How a scheduler tick ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Every live coroutine is parked on an external condition.
    AllBlocked,
    /// The caller's budget predicate fired before the fixpoint was reached.
    BudgetExceeded,
}

#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// A coroutine panicked; caught at the dispatcher boundary.
    #[error("coroutine panicked: {message}")]
    TaskPanicked { message: String },
}

type BoxedCoroutine = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

struct Task {
    /// Taken while the coroutine is being polled.
    fut: Option<BoxedCoroutine>,
    /// True while the task sits in the ready queue (dedupes wakes).
    queued: bool,
}

#[derive(Default)]
struct Inner {
    tasks: HashMap<u64, Task>,
    ready: VecDeque<u64>,
    next_id: u64,
}

/// Single-threaded cooperative scheduler handle.
///
/// Clones share the scheduler. `Send` so a cached workflow context can move
/// between worker threads across tasks; within one task the dispatcher is
/// only ever driven from a single thread.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Arc<Mutex<Inner>>,
}

struct TaskWaker {
    task: u64,
    inner: Weak<Mutex<Inner>>,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        if let Some(inner) = self.inner.upgrade() {
            let mut guard = inner.lock();
            let inner = &mut *guard;
            if let Some(task) = inner.tasks.get_mut(&self.task) {
                if !task.queued {
                    task.queued = true;
                    inner.ready.push_back(self.task);
                }
            }
        }
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a new coroutine. It runs within the current (or next) tick,
    /// after everything already in the ready queue.
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) -> TaskId {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.tasks.insert(id, Task { fut: Some(Box::pin(fut)), queued: true });
        inner.ready.push_back(id);
        tracing::trace!(task = id, "coroutine spawned");
        TaskId(id)
    }

    /// Number of coroutines that have not completed.
    pub fn live_tasks(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    /// Run coroutines until all of them are blocked (or done).
    pub fn run_until_all_blocked(&self) -> Result<TickStatus, DispatchError> {
        self.run_with_budget(&mut || false)
    }

    /// Run until all-blocked, or until `should_yield` returns true between
    /// coroutine polls. Used by the replay engine's heartbeat cutoff.
    pub fn run_with_budget(
        &self,
        should_yield: &mut dyn FnMut() -> bool,
    ) -> Result<TickStatus, DispatchError> {
        loop {
            if should_yield() {
                return Ok(TickStatus::BudgetExceeded);
            }

            let (id, mut fut) = {
                let mut inner = self.inner.lock();
                let id = loop {
                    match inner.ready.pop_front() {
                        // Entries for completed tasks are skipped.
                        Some(id) if inner.tasks.contains_key(&id) => break id,
                        Some(_) => continue,
                        None => return Ok(TickStatus::AllBlocked),
                    }
                };
                let task = match inner.tasks.get_mut(&id) {
                    Some(t) => t,
                    None => continue,
                };
                task.queued = false;
                match task.fut.take() {
                    Some(fut) => (id, fut),
                    // Re-entrant wake while being polled; nothing to do.
                    None => continue,
                }
            };

            let waker = Waker::from(Arc::new(TaskWaker {
                task: id,
                inner: Arc::downgrade(&self.inner),
            }));
            let mut cx = Context::from_waker(&waker);

            let poll = catch_unwind(AssertUnwindSafe(|| fut.as_mut().poll(&mut cx)));
            let mut inner = self.inner.lock();
            match poll {
                Err(payload) => {
                    inner.tasks.remove(&id);
                    let message = panic_message(payload.as_ref());
                    tracing::warn!(task = id, %message, "coroutine panicked");
                    return Err(DispatchError::TaskPanicked { message });
                }
                Ok(Poll::Ready(())) => {
                    inner.tasks.remove(&id);
                }
                Ok(Poll::Pending) => {
                    if let Some(task) = inner.tasks.get_mut(&id) {
                        task.fut = Some(fut);
                    }
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic payload of unknown type".to_string()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
