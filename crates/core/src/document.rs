// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned state document.
//!
//! The document is the `{ meta: { version }, data: { <controller>: ... } }`
//! envelope that storage hands to the runner. Only `meta.version` has a
//! fixed shape; everything under `data` is untyped JSON that each migration
//! narrows for itself.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors at the storage boundary (turning raw JSON into a document).
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("versioned document is not an object: {0}")]
    NotObject(&'static str),
    #[error("versioned document data is not an object: {0}")]
    DataNotObject(&'static str),
}

/// A schema version. Integer (`54`) or decimal (`120.2`).
///
/// Always finite and non-negative, so it can be totally ordered.
#[derive(Debug, Clone, Copy)]
pub struct Version(f64);

impl Version {
    pub fn new(major: u32) -> Self {
        Self(f64::from(major))
    }

    /// A decimal point-release version. `minor` supplies the digits after
    /// the point: `Version::point(120, 2)` is `120.2`, `Version::point(1, 15)`
    /// is `1.15`.
    ///
    /// Stored versions are plain JSON numbers, so trailing zeros carry no
    /// meaning: `point(120, 20)` is the same version as `point(120, 2)` and
    /// `point(120, 0)` is `120`.
    pub fn point(major: u32, minor: u32) -> Self {
        let digits = minor.checked_ilog10().map_or(1, |log| log + 1);
        let scale = 10u128.pow(digits);
        let scaled = u128::from(major) * scale + u128::from(minor);
        Self(scaled as f64 / scale as f64)
    }

    /// Returns `None` for NaN, infinities and negative numbers.
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Reads a version out of a JSON number; anything else is `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        value.as_f64().and_then(Self::from_f64)
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// JSON form: an integer when there is no fractional part.
    pub fn to_json(self) -> Value {
        if self.0.fract() == 0.0 && self.0 <= u64::MAX as f64 {
            Value::Number(Number::from(self.0 as u64))
        } else {
            Number::from_f64(self.0).map(Value::Number).unwrap_or(Value::Null)
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as u64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u32> for Version {
    fn from(major: u32) -> Self {
        Self::new(major)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid schema version: {value}")))
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// How far the document has been migrated. `None` when missing or
    /// not a number, which sorts before every migration.
    #[serde(
        default,
        deserialize_with = "lenient_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<Version>,
}

fn lenient_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Version>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(Version::from_json(&value))
}

/// The persisted application state plus its schema version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionedDocument {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl VersionedDocument {
    pub fn new(version: impl Into<Option<Version>>, data: Map<String, Value>) -> Self {
        Self {
            meta: Meta {
                version: version.into(),
            },
            data,
        }
    }

    /// Build a document from raw JSON as read from storage.
    ///
    /// A malformed `meta` is tolerated (the version becomes `None`), but
    /// `data` must be an object since every migration indexes into it.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(mut root) = value else {
            return Err(DocumentError::NotObject(crate::guard::type_name(Some(&value))));
        };
        let version = root
            .get("meta")
            .and_then(|meta| meta.get("version"))
            .and_then(Version::from_json);
        let data = match root.remove("data") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(data)) => data,
            Some(other) => {
                return Err(DocumentError::DataNotObject(crate::guard::type_name(Some(
                    &other,
                ))))
            }
        };
        Ok(Self::new(version, data))
    }

    pub fn into_value(self) -> Value {
        let mut meta = Map::new();
        if let Some(version) = self.meta.version {
            meta.insert("version".into(), version.to_json());
        }
        let mut root = Map::new();
        root.insert("meta".into(), Value::Object(meta));
        root.insert("data".into(), Value::Object(self.data));
        Value::Object(root)
    }

    pub fn version(&self) -> Option<Version> {
        self.meta.version
    }

    /// Deep copy with `meta.version` set to `version`.
    ///
    /// This is the first step of every migration: the stamp is unconditional,
    /// so a unit that no-ops on malformed input is still never re-run.
    pub fn stamped(&self, version: Version) -> Self {
        let mut next = self.clone();
        next.meta.version = Some(version);
        next
    }

    /// Whether `version` still has to be applied to this document.
    pub fn needs(&self, version: Version) -> bool {
        self.meta.version.is_none_or(|current| version > current)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
