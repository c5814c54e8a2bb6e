// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migrator configuration.
//!
//! Layered as defaults, then an optional TOML file, then the environment.
//!
//! ```toml
//! infura_project_id = "abc123"
//!
//! [failover_urls]
//! mainnet = "https://example.quiknode.pro/key"
//! ```

use crate::env;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Values some migrations need from the build environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigratorConfig {
    /// Project id embedded in Infura RPC URLs.
    pub infura_project_id: Option<String>,
    /// Failover RPC URL keyed by Infura subdomain (`mainnet`, `base`, ...).
    pub failover_urls: BTreeMap<String, String>,
}

impl MigratorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// `STATEMIG_CONFIG` file (if set) overlaid with environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match env::config_path() {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// Environment variables win over whatever was loaded.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(id) = env::infura_project_id() {
            self.infura_project_id = Some(id);
        }
        for (subdomain, _) in env::FAILOVER_URL_VARS {
            if let Some(url) = env::failover_url(subdomain) {
                self.failover_urls.insert((*subdomain).to_string(), url);
            }
        }
        self
    }

    pub fn with_infura_project_id(mut self, id: impl Into<String>) -> Self {
        self.infura_project_id = Some(id.into());
        self
    }

    pub fn with_failover_url(mut self, subdomain: impl Into<String>, url: impl Into<String>) -> Self {
        self.failover_urls.insert(subdomain.into(), url.into());
        self
    }

    /// Non-empty failover URL for `subdomain`.
    pub fn failover_url(&self, subdomain: &str) -> Option<&str> {
        self.failover_urls
            .get(subdomain)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
