// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic bounded channel.
//!
//! FIFO values, FIFO waiters. Receivers park when empty, senders park when
//! full; wakes hand off in arrival order so replays see identical delivery.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("channel closed")]
pub struct ChannelClosed;

struct ChanState<T> {
    buf: VecDeque<T>,
    capacity: usize,
    closed: bool,
    recv_wakers: VecDeque<Waker>,
    send_wakers: VecDeque<Waker>,
}

/// A buffered queue with deterministic select semantics.
pub struct WfChannel<T> {
    state: Arc<Mutex<ChanState<T>>>,
}

impl<T> Clone for WfChannel<T> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone() }
    }
}

impl<T> WfChannel<T> {
    /// A channel buffering up to `capacity` values (minimum 1).
    pub fn bounded(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChanState {
                buf: VecDeque::new(),
                capacity: capacity.max(1),
                closed: false,
                recv_wakers: VecDeque::new(),
                send_wakers: VecDeque::new(),
            })),
        }
    }

    pub fn try_send(&self, value: T) -> Result<(), T> {
        let mut state = self.state.lock();
        if state.closed || state.buf.len() >= state.capacity {
            return Err(value);
        }
        state.buf.push_back(value);
        if let Some(waker) = state.recv_wakers.pop_front() {
            waker.wake();
        }
        Ok(())
    }

    pub fn try_recv(&self) -> Option<T> {
        let mut state = self.state.lock();
        let value = state.buf.pop_front()?;
        if let Some(waker) = state.send_wakers.pop_front() {
            waker.wake();
        }
        Some(value)
    }

    /// Queue a value, parking until buffer space frees up.
    pub fn send(&self, value: T) -> SendFut<T> {
        SendFut { chan: self.clone(), value: Some(value) }
    }

    /// Receive the next value; resolves `None` once closed and drained.
    pub fn recv(&self) -> RecvFut<T> {
        RecvFut { chan: self.clone() }
    }

    /// Close the channel; parked receivers resolve `None`, parked senders
    /// fail with [`ChannelClosed`].
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        for waker in state.recv_wakers.drain(..) {
            waker.wake();
        }
        for waker in state.send_wakers.drain(..) {
            waker.wake();
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().buf.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

pub struct SendFut<T> {
    chan: WfChannel<T>,
    value: Option<T>,
}

impl<T: Unpin> Future for SendFut<T> {
    type Output = Result<(), ChannelClosed>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut state = this.chan.state.lock();
        if state.closed {
            return Poll::Ready(Err(ChannelClosed));
        }
        if state.buf.len() < state.capacity {
            if let Some(value) = this.value.take() {
                state.buf.push_back(value);
                if let Some(waker) = state.recv_wakers.pop_front() {
                    waker.wake();
                }
            }
            return Poll::Ready(Ok(()));
        }
        state.send_wakers.push_back(cx.waker().clone());
        Poll::Pending
    }
}

pub struct RecvFut<T> {
    chan: WfChannel<T>,
}

impl<T> Future for RecvFut<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.chan.state.lock();
        if let Some(value) = state.buf.pop_front() {
            if let Some(waker) = state.send_wakers.pop_front() {
                waker.wake();
            }
            return Poll::Ready(Some(value));
        }
        if state.closed {
            return Poll::Ready(None);
        }
        state.recv_wakers.push_back(cx.waker().clone());
        Poll::Pending
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
