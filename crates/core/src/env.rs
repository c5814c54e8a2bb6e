// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for migrator configuration.

use std::path::PathBuf;

/// Infura subdomains that can carry a failover URL, with the variable that
/// supplies it.
pub const FAILOVER_URL_VARS: &[(&str, &str)] = &[
    ("mainnet", "QUICKNODE_MAINNET_URL"),
    ("linea-mainnet", "QUICKNODE_LINEA_MAINNET_URL"),
    ("arbitrum", "QUICKNODE_ARBITRUM_URL"),
    ("avalanche", "QUICKNODE_AVALANCHE_URL"),
    ("optimism", "QUICKNODE_OPTIMISM_URL"),
    ("polygon", "QUICKNODE_POLYGON_URL"),
    ("base", "QUICKNODE_BASE_URL"),
];

/// Empty values count as unset.
fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

pub fn infura_project_id() -> Option<String> {
    non_empty("INFURA_PROJECT_ID")
}

/// Failover URL for an Infura subdomain, if one is configured.
pub fn failover_url(subdomain: &str) -> Option<String> {
    FAILOVER_URL_VARS
        .iter()
        .find(|(name, _)| *name == subdomain)
        .and_then(|(_, var)| non_empty(var))
}

/// Config file override
pub fn config_path() -> Option<PathBuf> {
    non_empty("STATEMIG_CONFIG").map(PathBuf::from)
}
