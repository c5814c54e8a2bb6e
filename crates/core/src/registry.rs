// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered registry of migrations and the sequential runner.
//!
//! The registry rejects a version that is not strictly greater than the last
//! one registered, so iteration order is always ascending. Running folds the
//! document through every unit newer than it, awaiting each one before the
//! next starts.

use crate::document::{Version, VersionedDocument};
use crate::migration::{Migration, MigrationContext, MigrationError};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::Instrument;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("migration {0} is already registered")]
    Duplicate(Version),
    #[error("migration {version} registered after {previous}")]
    OutOfOrder { version: Version, previous: Version },
}

/// Outcome of [`MigrationRegistry::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationRun {
    pub document: VersionedDocument,
    /// Versions that ran, ascending.
    pub applied: Vec<Version>,
    /// Top-level controllers whose value was added, removed or changed.
    pub changed_controllers: BTreeSet<String>,
}

#[derive(Default)]
pub struct MigrationRegistry {
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an already ordered list.
    pub fn from_migrations(migrations: Vec<Box<dyn Migration>>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for migration in migrations {
            registry.register_boxed(migration)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, migration: impl Migration + 'static) -> Result<(), RegistryError> {
        self.register_boxed(Box::new(migration))
    }

    pub fn register_boxed(&mut self, migration: Box<dyn Migration>) -> Result<(), RegistryError> {
        let version = migration.version();
        if self.migrations.iter().any(|m| m.version() == version) {
            return Err(RegistryError::Duplicate(version));
        }
        if let Some(previous) = self.latest_version() {
            if version < previous {
                return Err(RegistryError::OutOfOrder { version, previous });
            }
        }
        self.migrations.push(migration);
        Ok(())
    }

    pub fn versions(&self) -> Vec<Version> {
        self.migrations.iter().map(|m| m.version()).collect()
    }

    pub fn latest_version(&self) -> Option<Version> {
        self.migrations.last().map(|m| m.version())
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Document for a fresh install: already at the latest version, so no
    /// migration will ever run against it.
    pub fn initial_document(&self, data: Map<String, Value>) -> VersionedDocument {
        VersionedDocument::new(self.latest_version(), data)
    }

    /// Apply every migration newer than the document.
    pub async fn apply_all(
        &self,
        document: VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        Ok(self.fold(document, None, cx).await?.document)
    }

    /// Apply migrations newer than the document, up to and including `target`.
    pub async fn migrate_to(
        &self,
        document: VersionedDocument,
        target: Version,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        if let Some(current) = document.version() {
            if current > target {
                return Err(MigrationError::TooNew { current, target });
            }
        }
        Ok(self.fold(document, Some(target), cx).await?.document)
    }

    /// [`Self::apply_all`] plus a summary of what ran and what it touched.
    pub async fn run(
        &self,
        document: VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<MigrationRun, MigrationError> {
        self.fold(document, None, cx).await
    }

    async fn fold(
        &self,
        mut document: VersionedDocument,
        target: Option<Version>,
        cx: &MigrationContext,
    ) -> Result<MigrationRun, MigrationError> {
        let mut applied = Vec::new();
        let mut changed_controllers = BTreeSet::new();

        for migration in &self.migrations {
            let version = migration.version();
            if target.is_some_and(|target| version > target) {
                break;
            }
            if !document.needs(version) {
                tracing::debug!(%version, "skipping, already applied");
                continue;
            }

            let description = migration.description();
            let next = async {
                let start = std::time::Instant::now();
                let result = migration.migrate(&document, cx).await;
                let elapsed_ms = start.elapsed().as_millis() as u64;
                match &result {
                    Ok(_) => tracing::info!(elapsed_ms, "applied"),
                    Err(e) => tracing::error!(elapsed_ms, error = %e, "migration failed"),
                }
                result
            }
            .instrument(tracing::info_span!("migration.apply", %version, description))
            .await?;

            if next.version() != Some(version) {
                return Err(MigrationError::Defect {
                    version,
                    message: format!(
                        "returned document stamped {}",
                        next.version().map_or_else(|| "nothing".to_string(), |v| v.to_string())
                    ),
                });
            }

            changed_controllers.extend(changed_keys(&document.data, &next.data));
            applied.push(version);
            document = next;
        }

        Ok(MigrationRun {
            document,
            applied,
            changed_controllers,
        })
    }
}

fn changed_keys(before: &Map<String, Value>, after: &Map<String, Value>) -> Vec<String> {
    let mut changed: Vec<String> = after
        .iter()
        .filter(|(key, value)| before.get(key.as_str()) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect();
    changed.extend(
        before
            .keys()
            .filter(|key| !after.contains_key(key.as_str()))
            .cloned(),
    );
    changed
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
