// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostics and the error sink.
//!
//! Shape violations found while migrating are not failures: they are
//! described by a [`ShapeError`], wrapped in a [`Diagnostic`] carrying the
//! migration version, and handed to an [`ErrorReporter`]. The chain keeps
//! going either way.

use crate::document::Version;
use std::fmt;
use thiserror::Error;

/// A precondition a migration found violated in its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("typeof {path} is {actual}")]
    WrongType {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("{path} is missing")]
    Missing { path: String },
    #[error("{path}: {reason}")]
    InvalidEntry { path: String, reason: String },
    #[error("{message}")]
    Invalid { message: String },
}

impl ShapeError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn invalid_entry(path: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Dotted path of the offending value, when the error names one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::WrongType { path, .. } | Self::Missing { path } | Self::InvalidEntry { path, .. } => {
                Some(path.as_str())
            }
            Self::Invalid { .. } => None,
        }
    }

    /// Type the value should have had. Only type mismatches carry one.
    pub fn expected(&self) -> Option<&'static str> {
        match self {
            Self::WrongType { expected, .. } => Some(*expected),
            _ => None,
        }
    }
}

/// A shape error attributed to the migration that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub version: Version,
    pub error: ShapeError,
}

impl Diagnostic {
    pub fn new(version: Version, error: ShapeError) -> Self {
        Self { version, error }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Migration {}: {}", self.version, self.error)
    }
}

impl std::error::Error for Diagnostic {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Sink for non-fatal migration diagnostics.
///
/// Implementations must not fail and must not block; a migration calls this
/// inline and continues.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Discards every diagnostic.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpReporter;

impl ErrorReporter for NoOpReporter {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Emits each diagnostic as a `tracing` error event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::error!(
            version = %diagnostic.version,
            path = diagnostic.error.path(),
            expected = diagnostic.error.expected(),
            error = %diagnostic.error,
            "{diagnostic}"
        );
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::{Diagnostic, ErrorReporter};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records every diagnostic for later inspection.
    #[derive(Clone, Default)]
    pub struct FakeReporter {
        inner: Arc<Mutex<Vec<Diagnostic>>>,
    }

    impl FakeReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<Diagnostic> {
            self.inner.lock().clone()
        }

        /// Rendered `Migration <v>: <error>` messages, in report order.
        pub fn messages(&self) -> Vec<String> {
            self.inner.lock().iter().map(ToString::to_string).collect()
        }

        pub fn is_empty(&self) -> bool {
            self.inner.lock().is_empty()
        }
    }

    impl ErrorReporter for FakeReporter {
        fn report(&self, diagnostic: Diagnostic) {
            self.inner.lock().push(diagnostic);
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeReporter;

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
