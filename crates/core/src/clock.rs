// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker's two time domains.
//!
//! Wall time ([`Clock`]) drives pollers, retry backoff, and task-turn
//! budgets; tests swap in [`FakeClock`]. Simulated workflow time
//! ([`SimClock`]) is what workflow code observes: it advances only to the
//! service-side timestamps of `task:started` boundaries, so a replay reads
//! the exact values the live run did. Nothing reachable from workflow code
//! may touch the wall clock.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A source of wall time.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Controllable wall clock for tests.
///
/// Pins a base instant and epoch at construction; both views move together
/// through [`FakeClock::advance`], and never on their own.
#[derive(Clone)]
pub struct FakeClock {
    base: Instant,
    epoch_base_ms: u64,
    advanced: Arc<Mutex<Duration>>,
}

/// Default starting epoch for fake clocks; arbitrary but stable so test
/// assertions can use literal values.
const FAKE_EPOCH_BASE_MS: u64 = 1_000_000;

impl FakeClock {
    pub fn new() -> Self {
        Self::at_epoch_ms(FAKE_EPOCH_BASE_MS)
    }

    /// A fake clock whose epoch view starts at the given millisecond value.
    pub fn at_epoch_ms(epoch_base_ms: u64) -> Self {
        Self {
            base: Instant::now(),
            epoch_base_ms,
            advanced: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *self.advanced.lock() += duration;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + *self.advanced.lock()
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_base_ms + self.advanced.lock().as_millis() as u64
    }
}

/// Simulated workflow time.
///
/// Owned by one workflow context; advanced by the replay driver at each
/// `task:started` boundary to that event's service timestamp. History
/// timestamps are monotonic, so a stale timestamp (a heartbeat continuation
/// re-delivering a boundary) is ignored rather than moving time backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    now_ms: u64,
}

impl SimClock {
    /// Current simulated time in epoch milliseconds. This is the only time
    /// workflow code may observe.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move simulated time forward to a boundary timestamp. Stale
    /// timestamps (a re-delivered boundary) leave time where it is.
    pub fn advance_to(&mut self, timestamp_ms: u64) {
        self.now_ms = self.now_ms.max(timestamp_ms);
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
