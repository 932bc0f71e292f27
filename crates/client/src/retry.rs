// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry for transient RPC failures.
//!
//! Exponential backoff with full jitter. Non-transient errors and shutdown
//! surface immediately; exhausting the attempt budget returns the last
//! transient error.

use crate::service::RpcError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Backoff policy for service calls (distinct from the user-visible
/// activity retry policy; this one never crosses the wire).
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub initial_interval: Duration,
    pub backoff_coefficient: f64,
    pub max_interval: Duration,
    pub max_attempts: u32,
    /// Scale the delay by a random factor in `[1 - jitter, 1 + jitter]`.
    pub jitter: f64,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(20),
            backoff_coefficient: 2.0,
            max_interval: Duration::from_secs(6),
            max_attempts: 8,
            jitter: 0.2,
        }
    }
}

impl CallPolicy {
    /// Delay before retrying attempt `attempt` (1-based), jittered.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base = (self.initial_interval.as_secs_f64())
            * self.backoff_coefficient.max(1.0).powi(exp);
        let capped = base.min(self.max_interval.as_secs_f64());
        let jitter = if self.jitter > 0.0 {
            rand::thread_rng().gen_range(1.0 - self.jitter..=1.0 + self.jitter)
        } else {
            1.0
        };
        Duration::from_secs_f64(capped * jitter)
    }
}

/// Run `op` until it succeeds, fails non-transiently, runs out of attempts,
/// or the token fires.
pub async fn with_retry<T, F, Fut>(
    policy: &CallPolicy,
    shutdown: &CancellationToken,
    mut op: F,
) -> Result<T, RpcError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RpcError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) if policy.max_attempts != 0 && attempt >= policy.max_attempts => {
                tracing::warn!(error = %err, attempt, "retry budget exhausted");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay(attempt);
                tracing::debug!(error = %err, attempt, delay_ms = delay.as_millis() as u64, "transient failure, retrying");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.cancelled() => return Err(RpcError::Canceled),
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
