// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation for records a migration creates

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique identifiers.
///
/// Object-safe so a [`crate::MigrationContext`] can hold any generator
/// behind an `Arc`.
pub trait IdGen: Send + Sync {
    fn next(&self) -> String;
}

/// UUID-based ID generator for production use
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Sequential ID generator for testing
#[derive(Clone, Debug)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

/// Returns the same ID every time
#[derive(Clone, Debug)]
pub struct FixedIdGen(String);

impl FixedIdGen {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl IdGen for FixedIdGen {
    fn next(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
