// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wl-engine: the replay engine.
//!
//! Feeds history events to the decision state machines and the cooperative
//! dispatcher, advances the simulated clock at workflow-task boundaries, and
//! collects the decision batch each turn produces. Workflow code sees all of
//! this through [`WfApi`].

mod context;
mod error;
mod local;
mod replay;
mod workflow;

pub use context::{WorkflowInfo, WorkflowResult};
pub use error::ReplayError;
pub use local::{LocalActivityDisposition, LocalActivityRequest, LocalActivityResult};
pub use replay::{TurnOutput, WorkflowContext};
pub use workflow::{
    ActivityOptions, ChildWorkflowOptions, ContinueAsNewOptions, LocalActivityOptions, WfApi,
    WorkflowFn, DEFAULT_VERSION,
};
