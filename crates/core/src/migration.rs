// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The migration unit contract.
//!
//! A migration takes the previous document by reference and returns a new
//! one stamped with its own version. Shape problems in the input never
//! surface as errors here: they go to the context's [`ErrorReporter`] and
//! the affected subtree is left as it was. [`MigrationError`] is reserved
//! for programming defects.

use crate::clock::{Clock, SystemClock};
use crate::config::MigratorConfig;
use crate::diagnostics::{Diagnostic, ErrorReporter, NoOpReporter, ShapeError};
use crate::document::{Version, VersionedDocument};
use crate::id::{IdGen, UuidIdGen};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Defects that abort the chain. Malformed input is never one of these.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration {version} is defective: {message}")]
    Defect { version: Version, message: String },
    #[error("document version {current} is newer than target {target}")]
    TooNew { current: Version, target: Version },
}

/// Capabilities injected into every migration.
#[derive(Clone)]
pub struct MigrationContext {
    reporter: Arc<dyn ErrorReporter>,
    id_gen: Arc<dyn IdGen>,
    clock: Arc<dyn Clock>,
    config: Arc<MigratorConfig>,
}

impl Default for MigrationContext {
    fn default() -> Self {
        Self {
            reporter: Arc::new(NoOpReporter),
            id_gen: Arc::new(UuidIdGen),
            clock: Arc::new(SystemClock),
            config: Arc::new(MigratorConfig::default()),
        }
    }
}

impl MigrationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn with_id_gen(mut self, id_gen: impl IdGen + 'static) -> Self {
        self.id_gen = Arc::new(id_gen);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_config(mut self, config: MigratorConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn report(&self, version: Version, error: ShapeError) {
        tracing::warn!(%version, %error, "reporting malformed state");
        self.reporter.report(Diagnostic::new(version, error));
    }

    pub fn next_id(&self) -> String {
        self.id_gen.next()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }
}

/// One schema step.
#[async_trait]
pub trait Migration: Send + Sync {
    fn version(&self) -> Version;

    fn description(&self) -> &'static str;

    /// Produce the next document. `previous` is never modified.
    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError>;
}

/// All-or-nothing transform of the whole state.
///
/// `f` runs against a scratch copy; the copy replaces `data` only when `f`
/// succeeds. On failure the error is reported once. Returns whether the
/// transform was committed.
pub fn atomic<F>(cx: &MigrationContext, version: Version, data: &mut Map<String, Value>, f: F) -> bool
where
    F: FnOnce(&mut Map<String, Value>) -> Result<(), ShapeError>,
{
    let mut scratch = data.clone();
    match f(&mut scratch) {
        Ok(()) => {
            *data = scratch;
            true
        }
        Err(error) => {
            cx.report(version, error);
            false
        }
    }
}

/// Per-controller transform applied in place.
///
/// `f` must validate before it mutates, so an error leaves that controller
/// untouched. The error is reported and the caller moves on to the next
/// controller.
pub fn isolated<F>(cx: &MigrationContext, version: Version, data: &mut Map<String, Value>, f: F) -> bool
where
    F: FnOnce(&mut Map<String, Value>) -> Result<(), ShapeError>,
{
    match f(data) {
        Ok(()) => true,
        Err(error) => {
            cx.report(version, error);
            false
        }
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
