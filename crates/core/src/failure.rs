// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire failure records and the codec to and from [`WorkflowError`].
//!
//! Serializes with `{"info": {"type": "application", ...}}` typed-info
//! format. Cause chains nest recursively and survive a round trip; typed
//! info with an unrecognized tag decodes to a retryable application failure
//! with the tag preserved as the error type.

use crate::error::{TimeoutKind, WorkflowError, PANIC_ERROR_TYPE};
use crate::execution::WorkflowExecution;
use crate::payload::Payloads;
use crate::retry::RetryState;
use serde::{Deserialize, Serialize};

/// Source tag stamped on failures this worker encodes.
pub const FAILURE_SOURCE: &str = "windlass";

/// A failure as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stack_trace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<Failure>>,
    pub info: FailureInfo,
}

/// Typed failure info. The `type` tag selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureInfo {
    Application {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        error_type: String,
        #[serde(default)]
        non_retryable: bool,
        #[serde(default, skip_serializing_if = "Payloads::is_empty")]
        details: Payloads,
    },
    Canceled {
        #[serde(default, skip_serializing_if = "Payloads::is_empty")]
        details: Payloads,
    },
    Timeout {
        timeout_kind: TimeoutKind,
        #[serde(default, skip_serializing_if = "Payloads::is_empty")]
        last_heartbeat: Payloads,
    },
    Terminated {},
    Server {
        #[serde(default)]
        non_retryable: bool,
    },
    Activity {
        scheduled_event_id: i64,
        started_event_id: i64,
        identity: String,
        activity_type: String,
        activity_id: String,
        retry_state: RetryState,
    },
    ChildWorkflow {
        namespace: String,
        execution: WorkflowExecution,
        workflow_type: String,
        initiated_event_id: i64,
        started_event_id: i64,
        retry_state: RetryState,
    },
}

/// Mirror of the known variants, used only for deserialization so the
/// public type can fall back on unknown tags.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownInfo {
    Application {
        #[serde(default)]
        error_type: String,
        #[serde(default)]
        non_retryable: bool,
        #[serde(default)]
        details: Payloads,
    },
    Canceled {
        #[serde(default)]
        details: Payloads,
    },
    Timeout {
        timeout_kind: TimeoutKind,
        #[serde(default)]
        last_heartbeat: Payloads,
    },
    Terminated {},
    Server {
        #[serde(default)]
        non_retryable: bool,
    },
    Activity {
        scheduled_event_id: i64,
        started_event_id: i64,
        identity: String,
        activity_type: String,
        activity_id: String,
        retry_state: RetryState,
    },
    ChildWorkflow {
        namespace: String,
        execution: WorkflowExecution,
        workflow_type: String,
        initiated_event_id: i64,
        started_event_id: i64,
        retry_state: RetryState,
    },
}

impl From<KnownInfo> for FailureInfo {
    fn from(k: KnownInfo) -> Self {
        match k {
            KnownInfo::Application { error_type, non_retryable, details } => {
                FailureInfo::Application { error_type, non_retryable, details }
            }
            KnownInfo::Canceled { details } => FailureInfo::Canceled { details },
            KnownInfo::Timeout { timeout_kind, last_heartbeat } => {
                FailureInfo::Timeout { timeout_kind, last_heartbeat }
            }
            KnownInfo::Terminated {} => FailureInfo::Terminated {},
            KnownInfo::Server { non_retryable } => FailureInfo::Server { non_retryable },
            KnownInfo::Activity {
                scheduled_event_id,
                started_event_id,
                identity,
                activity_type,
                activity_id,
                retry_state,
            } => FailureInfo::Activity {
                scheduled_event_id,
                started_event_id,
                identity,
                activity_type,
                activity_id,
                retry_state,
            },
            KnownInfo::ChildWorkflow {
                namespace,
                execution,
                workflow_type,
                initiated_event_id,
                started_event_id,
                retry_state,
            } => FailureInfo::ChildWorkflow {
                namespace,
                execution,
                workflow_type,
                initiated_event_id,
                started_event_id,
                retry_state,
            },
        }
    }
}

const KNOWN_TAGS: &[&str] = &[
    "application",
    "canceled",
    "timeout",
    "terminated",
    "server",
    "activity",
    "child_workflow",
];

impl<'de> Deserialize<'de> for FailureInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let tag = value.get("type").and_then(|t| t.as_str()).unwrap_or_default().to_string();
        if KNOWN_TAGS.contains(&tag.as_str()) {
            KnownInfo::deserialize(value).map(FailureInfo::from).map_err(serde::de::Error::custom)
        } else {
            // Forward-compatibility: an unrecognized typed info becomes a
            // retryable application failure with the tag preserved.
            Ok(FailureInfo::Application {
                error_type: tag,
                non_retryable: false,
                details: Payloads::new(),
            })
        }
    }
}

/// Encode an in-memory error into its wire record.
pub fn encode_error(err: &WorkflowError) -> Failure {
    let cause = err.cause().map(|c| Box::new(encode_error(c)));
    match err {
        WorkflowError::Application { message, error_type, non_retryable, details, .. } => Failure {
            message: message.clone(),
            source: FAILURE_SOURCE.to_string(),
            stack_trace: String::new(),
            cause,
            info: FailureInfo::Application {
                error_type: error_type.clone(),
                non_retryable: *non_retryable,
                details: details.clone(),
            },
        },
        WorkflowError::Canceled { details } => Failure {
            message: "canceled".to_string(),
            source: FAILURE_SOURCE.to_string(),
            stack_trace: String::new(),
            cause,
            info: FailureInfo::Canceled { details: details.clone() },
        },
        WorkflowError::Timeout { kind, last_heartbeat, .. } => Failure {
            message: format!("{kind} timeout"),
            source: FAILURE_SOURCE.to_string(),
            stack_trace: String::new(),
            cause,
            info: FailureInfo::Timeout {
                timeout_kind: *kind,
                last_heartbeat: last_heartbeat.clone(),
            },
        },
        WorkflowError::Terminated { reason } => Failure {
            message: reason.clone(),
            source: FAILURE_SOURCE.to_string(),
            stack_trace: String::new(),
            cause,
            info: FailureInfo::Terminated {},
        },
        WorkflowError::Server { message, non_retryable } => Failure {
            message: message.clone(),
            source: FAILURE_SOURCE.to_string(),
            stack_trace: String::new(),
            cause,
            info: FailureInfo::Server { non_retryable: *non_retryable },
        },
        WorkflowError::Activity {
            scheduled_event_id,
            started_event_id,
            identity,
            activity_type,
            activity_id,
            retry_state,
            ..
        } => Failure {
            message: format!("activity {activity_type} failed"),
            source: FAILURE_SOURCE.to_string(),
            stack_trace: String::new(),
            cause,
            info: FailureInfo::Activity {
                scheduled_event_id: *scheduled_event_id,
                started_event_id: *started_event_id,
                identity: identity.clone(),
                activity_type: activity_type.clone(),
                activity_id: activity_id.clone(),
                retry_state: *retry_state,
            },
        },
        WorkflowError::ChildWorkflow {
            namespace,
            execution,
            workflow_type,
            initiated_event_id,
            started_event_id,
            retry_state,
            ..
        } => Failure {
            message: format!("child workflow {workflow_type} failed"),
            source: FAILURE_SOURCE.to_string(),
            stack_trace: String::new(),
            cause,
            info: FailureInfo::ChildWorkflow {
                namespace: namespace.clone(),
                execution: execution.clone(),
                workflow_type: workflow_type.clone(),
                initiated_event_id: *initiated_event_id,
                started_event_id: *started_event_id,
                retry_state: *retry_state,
            },
        },
        WorkflowError::Panic { message, stack_trace } => Failure {
            message: message.clone(),
            source: FAILURE_SOURCE.to_string(),
            stack_trace: stack_trace.clone(),
            cause: None,
            info: FailureInfo::Application {
                error_type: PANIC_ERROR_TYPE.to_string(),
                non_retryable: true,
                details: Payloads::new(),
            },
        },
    }
}

/// Decode a wire record back into the in-memory taxonomy.
pub fn decode_failure(failure: &Failure) -> WorkflowError {
    let cause = failure.cause.as_deref().map(|c| Box::new(decode_failure(c)));
    match &failure.info {
        FailureInfo::Application { error_type, non_retryable, details } => {
            if error_type == PANIC_ERROR_TYPE && *non_retryable {
                WorkflowError::Panic {
                    message: failure.message.clone(),
                    stack_trace: failure.stack_trace.clone(),
                }
            } else {
                WorkflowError::Application {
                    message: failure.message.clone(),
                    error_type: error_type.clone(),
                    non_retryable: *non_retryable,
                    details: details.clone(),
                    cause,
                }
            }
        }
        FailureInfo::Canceled { details } => WorkflowError::Canceled { details: details.clone() },
        FailureInfo::Timeout { timeout_kind, last_heartbeat } => WorkflowError::Timeout {
            kind: *timeout_kind,
            last_heartbeat: last_heartbeat.clone(),
            cause,
        },
        FailureInfo::Terminated {} => WorkflowError::Terminated { reason: failure.message.clone() },
        FailureInfo::Server { non_retryable } => WorkflowError::Server {
            message: failure.message.clone(),
            non_retryable: *non_retryable,
        },
        FailureInfo::Activity {
            scheduled_event_id,
            started_event_id,
            identity,
            activity_type,
            activity_id,
            retry_state,
        } => WorkflowError::Activity {
            scheduled_event_id: *scheduled_event_id,
            started_event_id: *started_event_id,
            identity: identity.clone(),
            activity_type: activity_type.clone(),
            activity_id: activity_id.clone(),
            retry_state: *retry_state,
            cause: cause
                .unwrap_or_else(|| Box::new(WorkflowError::application(failure.message.clone()))),
        },
        FailureInfo::ChildWorkflow {
            namespace,
            execution,
            workflow_type,
            initiated_event_id,
            started_event_id,
            retry_state,
        } => WorkflowError::ChildWorkflow {
            namespace: namespace.clone(),
            execution: execution.clone(),
            workflow_type: workflow_type.clone(),
            initiated_event_id: *initiated_event_id,
            started_event_id: *started_event_id,
            retry_state: *retry_state,
            cause: cause
                .unwrap_or_else(|| Box::new(WorkflowError::application(failure.message.clone()))),
        },
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
