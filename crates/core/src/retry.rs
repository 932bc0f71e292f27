// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry and timeout policy shared by activities, local activities, and
//! service calls.
//!
//! Backoff is `min(max_interval, initial × coeff^(attempt-1))`, clamped to
//! whatever budget remains before the schedule-to-close deadline.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal classification for an exhausted or terminated retry chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryState {
    InProgress,
    NonRetryableFailure,
    Timeout,
    MaximumAttemptsReached,
    CancelRequested,
}

crate::simple_display! {
    RetryState {
        InProgress => "in_progress",
        NonRetryableFailure => "non_retryable_failure",
        Timeout => "timeout",
        MaximumAttemptsReached => "maximum_attempts_reached",
        CancelRequested => "cancel_requested",
    }
}

/// Outcome of asking a policy about the next attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given delay.
    Retry { delay: Duration },
    /// Stop; the chain ends in the given terminal state.
    Stop { state: RetryState },
}

/// Exponential backoff policy with non-retryable type filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(with = "duration_ms")]
    pub initial_interval: Duration,
    /// Must be ≥ 1.0.
    pub backoff_coefficient: f64,
    #[serde(with = "duration_ms")]
    pub max_interval: Duration,
    /// 0 means unlimited attempts.
    pub max_attempts: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_retryable_error_types: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            max_interval: Duration::from_secs(100),
            max_attempts: 0,
            non_retryable_error_types: Vec::new(),
        }
    }
}

impl RetryPolicy {
    /// Raw backoff for the given attempt (1-based), without budget clamping.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1);
        let factor = self.backoff_coefficient.max(1.0).powi(exp.min(i32::MAX as u32) as i32);
        let millis = (self.initial_interval.as_millis() as f64) * factor;
        let capped = millis.min(self.max_interval.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Decide whether attempt `attempt` (which just failed with `err`) gets a
    /// successor.
    ///
    /// `elapsed` is the time since the action was first scheduled;
    /// `schedule_to_close` is the total budget, if one was set.
    pub fn next_attempt(
        &self,
        attempt: u32,
        err: &WorkflowError,
        elapsed: Duration,
        schedule_to_close: Option<Duration>,
    ) -> RetryDecision {
        if !crate::error::is_retryable(err, &self.non_retryable_error_types) {
            return RetryDecision::Stop { state: RetryState::NonRetryableFailure };
        }
        if self.max_attempts != 0 && attempt >= self.max_attempts {
            return RetryDecision::Stop { state: RetryState::MaximumAttemptsReached };
        }

        let delay = self.backoff(attempt);
        match schedule_to_close {
            Some(budget) => {
                let remaining = budget.saturating_sub(elapsed);
                if remaining.is_zero() || delay >= remaining {
                    RetryDecision::Stop { state: RetryState::Timeout }
                } else {
                    RetryDecision::Retry { delay }
                }
            }
            None => RetryDecision::Retry { delay },
        }
    }
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (duration.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
