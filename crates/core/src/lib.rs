// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! statemig-core: versioned state documents and the sequential migration runner

pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod env;
pub mod guard;
pub mod id;
pub mod migration;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, MigratorConfig};
pub use diagnostics::{Diagnostic, ErrorReporter, NoOpReporter, ShapeError, TracingReporter};
pub use document::{DocumentError, Meta, Version, VersionedDocument};
pub use guard::{has_property, is_object, type_name, FieldPath};
pub use id::{FixedIdGen, IdGen, SequentialIdGen, UuidIdGen};
pub use migration::{atomic, isolated, Migration, MigrationContext, MigrationError};
pub use registry::{MigrationRegistry, MigrationRun, RegistryError};

#[cfg(any(test, feature = "test-support"))]
pub use diagnostics::FakeReporter;
