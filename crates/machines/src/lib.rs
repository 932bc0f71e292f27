// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wl-machines: decision state machines.
//!
//! One machine exists per outstanding action of a workflow execution (timer,
//! activity, child workflow, external cancel/signal, marker, search-attribute
//! upsert). Machines ingest local intents from workflow code and remote
//! history events from the service, and the registry flushes the resulting
//! decisions in creation order.
//!
//! Any event the transition tables reject is a fatal
//! [`MachineError::InvalidTransition`]; the worker fails the current
//! workflow task with a non-retryable panic failure and the service
//! redelivers the task for a clean replay.

mod activity;
mod child;
mod external;
mod machine;
mod marker;
mod registry;
mod state;
mod timer;

pub use machine::{
    CancelEffect, MachineEntry, MachineError, MachineId, MachineKind, MachineOutcome,
    MachineResolution, WakeHandle,
};
pub use registry::MachineRegistry;
pub use state::MachineState;
