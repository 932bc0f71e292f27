// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fatal replay errors.

use thiserror::Error;
use wl_machines::MachineError;

/// Errors that abort the current workflow task.
///
/// All of them are reported to the service as a non-retryable panic failure;
/// the service redelivers the task with the same history, giving the worker
/// a clean replay.
#[derive(Debug, Clone, Error)]
pub enum ReplayError {
    /// A state machine rejected an event or intent.
    #[error(transparent)]
    Machine(#[from] MachineError),

    /// Workflow code panicked; caught at the dispatcher boundary.
    #[error("workflow panic: {message}")]
    Panic { message: String },

    /// A local activity result arrived for an unknown correlation ID.
    #[error("unknown local activity: {marker_id}")]
    UnknownLocalActivity { marker_id: String },
}

impl ReplayError {
    /// The wire failure the poller reports for this error.
    pub fn to_failure(&self) -> wl_core::failure::Failure {
        let err = wl_core::error::WorkflowError::panic(self.to_string(), String::new());
        wl_core::failure::encode_error(&err)
    }
}
