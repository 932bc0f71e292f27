// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory error taxonomy for workflow and activity outcomes.
//!
//! These are the variants user code sees; [`crate::failure`] maps them to and
//! from the wire `Failure` record. Cause chains nest through boxed causes and
//! are preserved across the codec.

use crate::execution::WorkflowExecution;
use crate::payload::Payloads;
use crate::retry::RetryState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which deadline a timeout breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutKind {
    ScheduleToStart,
    ScheduleToClose,
    StartToClose,
    Heartbeat,
}

crate::simple_display! {
    TimeoutKind {
        ScheduleToStart => "schedule_to_start",
        ScheduleToClose => "schedule_to_close",
        StartToClose => "start_to_close",
        Heartbeat => "heartbeat",
    }
}

impl TimeoutKind {
    /// Only start-to-close and heartbeat timeouts leave the action eligible
    /// for another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TimeoutKind::StartToClose | TimeoutKind::Heartbeat)
    }
}

/// Every failure shape the worker produces or consumes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    /// User-returned domain error.
    #[error("{message}")]
    Application {
        message: String,
        /// User-assigned error type, matched against non-retryable lists.
        error_type: String,
        non_retryable: bool,
        details: Payloads,
        cause: Option<Box<WorkflowError>>,
    },

    /// The action (or whole workflow) was canceled.
    #[error("canceled")]
    Canceled { details: Payloads },

    /// A deadline was breached.
    #[error("{kind} timeout")]
    Timeout {
        kind: TimeoutKind,
        last_heartbeat: Payloads,
        cause: Option<Box<WorkflowError>>,
    },

    /// The execution was terminated from outside.
    #[error("terminated")]
    Terminated { reason: String },

    /// Service-originated failure.
    #[error("{message}")]
    Server { message: String, non_retryable: bool },

    /// Wraps the outcome of a failed activity.
    #[error("activity {activity_type} failed")]
    Activity {
        scheduled_event_id: i64,
        started_event_id: i64,
        identity: String,
        activity_type: String,
        activity_id: String,
        retry_state: RetryState,
        cause: Box<WorkflowError>,
    },

    /// Wraps the outcome of a failed child workflow.
    #[error("child workflow {workflow_type} failed")]
    ChildWorkflow {
        namespace: String,
        execution: WorkflowExecution,
        workflow_type: String,
        initiated_event_id: i64,
        started_event_id: i64,
        retry_state: RetryState,
        cause: Box<WorkflowError>,
    },

    /// Unrecovered panic inside workflow code. Never retried.
    #[error("workflow panic: {message}")]
    Panic { message: String, stack_trace: String },
}

/// Wire error-type tag carried by panics encoded as application failures.
pub const PANIC_ERROR_TYPE: &str = "PanicError";

impl WorkflowError {
    /// Plain application error with defaults.
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
            error_type: String::new(),
            non_retryable: false,
            details: Payloads::new(),
            cause: None,
        }
    }

    pub fn canceled() -> Self {
        Self::Canceled { details: Payloads::new() }
    }

    pub fn timeout(kind: TimeoutKind) -> Self {
        Self::Timeout { kind, last_heartbeat: Payloads::new(), cause: None }
    }

    pub fn panic(message: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        Self::Panic { message: message.into(), stack_trace: stack_trace.into() }
    }

    /// Next error in the cause chain, if any.
    pub fn cause(&self) -> Option<&WorkflowError> {
        match self {
            WorkflowError::Application { cause, .. } | WorkflowError::Timeout { cause, .. } => {
                cause.as_deref()
            }
            WorkflowError::Activity { cause, .. } | WorkflowError::ChildWorkflow { cause, .. } => {
                Some(cause)
            }
            _ => None,
        }
    }

    /// Innermost error of the cause chain (self when there is no cause).
    pub fn root_cause(&self) -> &WorkflowError {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, WorkflowError::Canceled { .. })
    }
}

crate::simple_display! {
    WorkflowErrorKind {
        Application => "application",
        Canceled => "canceled",
        Timeout => "timeout",
        Terminated => "terminated",
        Server => "server",
        Activity => "activity",
        ChildWorkflow => "child_workflow",
        Panic => "panic",
    }
}

/// Tag-only variant of [`WorkflowError`] for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowErrorKind {
    Application,
    Canceled,
    Timeout,
    Terminated,
    Server,
    Activity,
    ChildWorkflow,
    Panic,
}

impl From<&WorkflowError> for WorkflowErrorKind {
    fn from(e: &WorkflowError) -> Self {
        match e {
            WorkflowError::Application { .. } => WorkflowErrorKind::Application,
            WorkflowError::Canceled { .. } => WorkflowErrorKind::Canceled,
            WorkflowError::Timeout { .. } => WorkflowErrorKind::Timeout,
            WorkflowError::Terminated { .. } => WorkflowErrorKind::Terminated,
            WorkflowError::Server { .. } => WorkflowErrorKind::Server,
            WorkflowError::Activity { .. } => WorkflowErrorKind::Activity,
            WorkflowError::ChildWorkflow { .. } => WorkflowErrorKind::ChildWorkflow,
            WorkflowError::Panic { .. } => WorkflowErrorKind::Panic,
        }
    }
}

/// Whether an attempt that failed with `err` may be retried, given the
/// caller's list of non-retryable application error types.
///
/// Wrapper errors (activity, child workflow) defer to their wrapped cause.
pub fn is_retryable(err: &WorkflowError, non_retryable_types: &[String]) -> bool {
    match err {
        WorkflowError::Canceled { .. }
        | WorkflowError::Terminated { .. }
        | WorkflowError::Panic { .. } => false,
        WorkflowError::Timeout { kind, .. } => kind.is_retryable(),
        WorkflowError::Server { non_retryable, .. } => !non_retryable,
        WorkflowError::Application { non_retryable, error_type, .. } => {
            !non_retryable && !non_retryable_types.iter().any(|t| t == error_type)
        }
        WorkflowError::Activity { cause, .. } | WorkflowError::ChildWorkflow { cause, .. } => {
            is_retryable(cause, non_retryable_types)
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
