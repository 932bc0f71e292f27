// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellation scopes.
//!
//! A scope tree mirrors the context tree of workflow code: cancelling a
//! scope cancels every scope derived from it. Coroutines observe
//! cancellation by awaiting [`CancelScope::canceled`] (usually through a
//! select) or polling [`CancelScope::is_canceled`] at suspension points.

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll, Waker};

struct ScopeState {
    canceled: bool,
    wakers: Vec<Waker>,
    children: Vec<Weak<Mutex<ScopeState>>>,
}

/// One node of the cancellation tree.
#[derive(Clone)]
pub struct CancelScope {
    state: Arc<Mutex<ScopeState>>,
}

impl CancelScope {
    /// A root scope, not derived from anything.
    pub fn root() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScopeState {
                canceled: false,
                wakers: Vec::new(),
                children: Vec::new(),
            })),
        }
    }

    /// Derive a child scope. Cancelling `self` cancels the child; cancelling
    /// the child leaves `self` untouched.
    pub fn child(&self) -> CancelScope {
        let child = CancelScope::root();
        let mut state = self.state.lock();
        if state.canceled {
            child.cancel();
        } else {
            state.children.push(Arc::downgrade(&child.state));
        }
        child
    }

    /// Cancel this scope and everything derived from it.
    pub fn cancel(&self) {
        let (wakers, children) = {
            let mut state = self.state.lock();
            if state.canceled {
                return;
            }
            state.canceled = true;
            (std::mem::take(&mut state.wakers), std::mem::take(&mut state.children))
        };
        for waker in wakers {
            waker.wake();
        }
        for child in children {
            if let Some(child) = child.upgrade() {
                CancelScope { state: child }.cancel();
            }
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.state.lock().canceled
    }

    /// Resolves once the scope is canceled.
    pub fn canceled(&self) -> CanceledFut {
        CanceledFut { scope: self.clone() }
    }
}

pub struct CanceledFut {
    scope: CancelScope,
}

impl Future for CanceledFut {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.scope.state.lock();
        if state.canceled {
            Poll::Ready(())
        } else {
            state.wakers.push(cx.waker().clone());
            Poll::Pending
        }
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
