// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wl-core: Core library for the Windlass workflow worker SDK.
//!
//! Holds the pieces every other crate leans on: identifier types, the clock
//! abstraction, payloads and the data-converter contract, the error taxonomy
//! with its wire failure codec, and the shared retry/timeout policy.

pub mod macros;

pub mod clock;
pub mod error;
pub mod execution;
pub mod failure;
pub mod id;
pub mod payload;
pub mod propagator;
pub mod retry;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(test)]
mod property_tests;

pub use clock::{Clock, FakeClock, SimClock, SystemClock};
pub use error::{is_retryable, TimeoutKind, WorkflowError};
pub use execution::{
    ActivityId, ActivityType, RunId, TaskList, TaskToken, TimerId, WorkflowExecution, WorkflowId,
    WorkflowType,
};
pub use failure::{decode_failure, encode_error, Failure, FailureInfo};
pub use id::{short, IdGen, SeqIdGen, UuidIdGen};
pub use payload::{ConvertError, DataConverter, DefaultConverter, Payload, Payloads};
pub use propagator::ContextPropagator;
pub use retry::{RetryDecision, RetryPolicy, RetryState};
