// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wl-dispatch: single-threaded deterministic cooperative scheduler.
//!
//! Workflow code runs as coroutines on a [`Dispatcher`]. A scheduler tick
//! polls coroutines from a FIFO ready queue until every one of them is
//! parked on an external condition (a settable future, a channel, a cancel
//! scope) — the *all-blocked* fixpoint. Identical wake order in, identical
//! execution order out; nothing here reads wall time or randomness.
//!
//! Panics in coroutines are caught at this boundary only and surfaced as
//! [`DispatchError::TaskPanicked`]; everywhere else a panic is a programmer
//! error that takes the worker down.

mod cancel;
mod channel;
mod dispatcher;
mod future;
mod selector;

pub use cancel::CancelScope;
pub use channel::{ChannelClosed, WfChannel};
pub use dispatcher::{DispatchError, Dispatcher, TaskId, TickStatus};
pub use future::{future, Settable, WfFuture};
pub use selector::Select;
