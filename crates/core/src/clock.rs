// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn epoch_ms(&self) -> u64;
}

/// Reads the system clock through chrono.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Manually driven clock for tests. Clones share the same time.
#[derive(Clone, Debug)]
pub struct FakeClock {
    epoch_ms: Arc<AtomicU64>,
}

impl FakeClock {
    /// Starts at a fixed, arbitrary instant (2024-01-01T00:00:00Z).
    pub fn new() -> Self {
        Self::at(1_704_067_200_000)
    }

    pub fn at(epoch_ms: u64) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicU64::new(epoch_ms)),
        }
    }

    pub fn set_epoch_ms(&self, epoch_ms: u64) {
        self.epoch_ms.store(epoch_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.epoch_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
