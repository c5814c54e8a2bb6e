// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation primitives for narrowing untyped state.
//!
//! Every migration treats its input as untrusted JSON. These helpers are the
//! only vocabulary it needs: two total predicates (`is_object`,
//! `has_property`), a runtime type label for diagnostics, and `expect_*`
//! narrowing functions that turn a failed check into a [`ShapeError`] so a
//! validation sequence can short-circuit with `?`.

use crate::diagnostics::ShapeError;
use serde_json::{Map, Value};
use std::fmt;

/// True iff `value` is a JSON object (not an array, not null, not a primitive).
pub fn is_object(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

/// True iff `value` is an object that directly defines `key`, whatever the
/// property's value (including `null`).
pub fn has_property(value: &Value, key: &str) -> bool {
    value.as_object().is_some_and(|map| map.contains_key(key))
}

/// Runtime type label of a possibly-absent value.
pub fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Dotted path used in diagnostics, rooted at `state`.
///
/// ```ignore
/// let path = FieldPath::root().key("NetworkController").key("providerConfig");
/// assert_eq!(path.to_string(), "state.NetworkController.providerConfig");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn root() -> Self {
        Self("state".to_string())
    }

    /// Path to a top-level controller.
    pub fn controller(name: &str) -> Self {
        Self::root().key(name)
    }

    pub fn key(&self, key: &str) -> Self {
        Self(format!("{}.{}", self.0, key))
    }

    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn wrong_type(path: &FieldPath, expected: &'static str, actual: Option<&Value>) -> ShapeError {
    ShapeError::WrongType {
        path: path.to_string(),
        expected,
        actual: type_name(actual),
    }
}

/// Narrow a possibly-absent value to an object.
pub fn expect_object<'a>(
    value: Option<&'a Value>,
    path: &FieldPath,
) -> Result<&'a Map<String, Value>, ShapeError> {
    match value {
        Some(Value::Object(map)) => Ok(map),
        other => Err(wrong_type(path, "object", other)),
    }
}

/// Mutable counterpart of [`expect_object`].
pub fn expect_object_mut<'a>(
    value: Option<&'a mut Value>,
    path: &FieldPath,
) -> Result<&'a mut Map<String, Value>, ShapeError> {
    match value {
        Some(Value::Object(map)) => Ok(map),
        other => Err(wrong_type(path, "object", other.as_deref())),
    }
}

pub fn expect_array_mut<'a>(
    value: Option<&'a mut Value>,
    path: &FieldPath,
) -> Result<&'a mut Vec<Value>, ShapeError> {
    match value {
        Some(Value::Array(items)) => Ok(items),
        other => Err(wrong_type(path, "array", other.as_deref())),
    }
}

pub fn expect_str<'a>(value: Option<&'a Value>, path: &FieldPath) -> Result<&'a str, ShapeError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        other => Err(wrong_type(path, "string", other)),
    }
}

/// Like [`expect_object`], but absence is not an error.
///
/// Only a missing key yields `Ok(None)`. `null` is a value like any other
/// and fails the check.
pub fn optional_object<'a>(
    value: Option<&'a Value>,
    path: &FieldPath,
) -> Result<Option<&'a Map<String, Value>>, ShapeError> {
    value.map(|value| expect_object(Some(value), path)).transpose()
}

/// Mutable counterpart of [`optional_object`].
pub fn optional_object_mut<'a>(
    value: Option<&'a mut Value>,
    path: &FieldPath,
) -> Result<Option<&'a mut Map<String, Value>>, ShapeError> {
    value.map(|value| expect_object_mut(Some(value), path)).transpose()
}

/// True for `0x`-prefixed hexadecimal strings.
pub fn is_hex_string(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
