//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for running stored documents through the
//! production migration chain.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

pub use serde_json::{json, Value};
pub use statemig_core::{
    FakeReporter, FixedIdGen, Migration, MigrationContext, MigrationError, MigratorConfig, Version,
    VersionedDocument,
};

use statemig_core::MigrationRegistry;

/// A stored document as it would be read from disk.
pub fn stored(version: impl Into<Option<Version>>, data: Value) -> VersionedDocument {
    let Value::Object(data) = data else {
        panic!("document data must be an object");
    };
    VersionedDocument::new(version, data)
}

pub fn v(n: u32) -> Version {
    Version::new(n)
}

pub fn production() -> MigrationRegistry {
    statemig_migrations::registry().unwrap()
}

/// Runs documents through the production chain with a recording reporter.
pub struct Chain {
    registry: MigrationRegistry,
    reporter: FakeReporter,
    cx: MigrationContext,
}

impl Chain {
    pub fn new() -> Self {
        Self::with_context(MigrationContext::new())
    }

    pub fn with_context(cx: MigrationContext) -> Self {
        let reporter = FakeReporter::new();
        Self {
            registry: production(),
            cx: cx.with_reporter(reporter.clone()),
            reporter,
        }
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub fn cx(&self) -> &MigrationContext {
        &self.cx
    }

    /// Every report so far, formatted as `Migration <version>: <error>`.
    pub fn reports(&self) -> Vec<String> {
        self.reporter.messages()
    }

    /// Apply everything newer than `document`; panics on a defect.
    pub async fn migrate(&self, document: VersionedDocument) -> VersionedDocument {
        self.registry
            .apply_all(document, &self.cx)
            .await
            .unwrap_or_else(|e| panic!("migration chain failed: {e}"))
    }

    /// Apply up to and including `target`; panics on a defect.
    pub async fn migrate_to(&self, document: VersionedDocument, target: Version) -> VersionedDocument {
        self.registry
            .migrate_to(document, target, &self.cx)
            .await
            .unwrap_or_else(|e| panic!("migration chain failed: {e}"))
    }
}

pub fn data_of(document: &VersionedDocument) -> Value {
    Value::Object(document.data.clone())
}
