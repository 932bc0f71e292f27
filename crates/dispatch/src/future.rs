// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-shot completable futures.
//!
//! The [`Settable`] half lives with whoever produces the result (a state
//! machine resolution, a signal delivery); the [`WfFuture`] half is awaited
//! by workflow code. Settling wakes the parked coroutine on the dispatcher's
//! ready queue.

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

struct Shared<T> {
    value: Option<T>,
    waker: Option<Waker>,
    settled: bool,
}

/// Producer half: completes the paired [`WfFuture`] exactly once.
pub struct Settable<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

/// Consumer half: resolves to the settled value.
pub struct WfFuture<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

/// Create a connected settable/future pair.
pub fn future<T>() -> (Settable<T>, WfFuture<T>) {
    let shared = Arc::new(Mutex::new(Shared { value: None, waker: None, settled: false }));
    (Settable { shared: shared.clone() }, WfFuture { shared })
}

impl<T> Settable<T> {
    /// Complete the future. Returns false if it was already settled (the
    /// value is dropped in that case).
    pub fn settle(&self, value: T) -> bool {
        let mut shared = self.shared.lock();
        if shared.settled {
            return false;
        }
        shared.settled = true;
        shared.value = Some(value);
        if let Some(waker) = shared.waker.take() {
            waker.wake();
        }
        true
    }

    pub fn is_settled(&self) -> bool {
        self.shared.lock().settled
    }
}

impl<T> Clone for Settable<T> {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone() }
    }
}

impl<T> Future for WfFuture<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let mut shared = self.shared.lock();
        match shared.value.take() {
            Some(value) => Poll::Ready(value),
            None => {
                shared.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
#[path = "future_tests.rs"]
mod tests;
