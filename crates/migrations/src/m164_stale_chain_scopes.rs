// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 164: drop permission scopes for chains that no longer exist.
//!
//! CAIP-25 scopes name chains in decimal (`eip155:8453`) while network
//! configurations are keyed in hex (`0x2105`). A scope survives if its chain
//! has a configuration or if it is not an `eip155:<decimal>` scope at all
//! (`wallet`, `wallet:eip155`, other namespaces).
//!
//! Subjects, permissions and caveats that don't have the expected layout are
//! skipped; they belong to other permission types.

use crate::chain_id::hex_to_decimal;
use async_trait::async_trait;
use serde_json::{Map, Value};
use statemig_core::guard::{expect_object, expect_object_mut, FieldPath};
use statemig_core::{
    isolated, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};
use std::collections::BTreeSet;

pub struct StaleChainScopes;

const CAIP25_PERMISSION: &str = "endowment:caip25";
const CAIP25_CAVEAT: &str = "authorizedScopes";
const SCOPE_KEYS: [&str; 2] = ["requiredScopes", "optionalScopes"];

#[async_trait]
impl Migration for StaleChainScopes {
    fn version(&self) -> Version {
        Version::new(164)
    }

    fn description(&self) -> &'static str {
        "remove permission scopes for deleted networks"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let version = self.version();
        let mut next = previous.stamped(version);

        if !next.data.contains_key("NetworkController")
            || !next.data.contains_key("PermissionController")
        {
            tracing::debug!("NetworkController or PermissionController absent, skipping");
            return Ok(next);
        }

        isolated(cx, version, &mut next.data, |data| {
            let Some(known) = configured_chains(data)? else {
                return Ok(());
            };
            let path = FieldPath::controller("PermissionController").key("subjects");
            let controller = expect_object_mut(
                data.get_mut("PermissionController"),
                &FieldPath::controller("PermissionController"),
            )?;
            let subjects = expect_object_mut(controller.get_mut("subjects"), &path)?;
            for (origin, subject) in subjects.iter_mut() {
                let removed = prune_subject(subject, &known);
                if removed > 0 {
                    tracing::debug!(%origin, removed, "pruned stale chain scopes");
                }
            }
            Ok(())
        });

        Ok(next)
    }
}

/// Decimal references of every configured chain, or `None` when the
/// configurations are absent.
fn configured_chains(data: &Map<String, Value>) -> Result<Option<BTreeSet<String>>, ShapeError> {
    let path = FieldPath::controller("NetworkController");
    let controller = expect_object(data.get("NetworkController"), &path)?;
    let Some(by_chain) = controller.get("networkConfigurationsByChainId") else {
        tracing::debug!("networkConfigurationsByChainId absent, skipping");
        return Ok(None);
    };
    let by_chain = expect_object(Some(by_chain), &path.key("networkConfigurationsByChainId"))?;
    Ok(Some(by_chain.keys().filter_map(|key| hex_to_decimal(key)).collect()))
}

/// Prune one subject's CAIP-25 caveats. Returns how many scopes were removed.
fn prune_subject(subject: &mut Value, known: &BTreeSet<String>) -> usize {
    let Some(caveats) = subject
        .get_mut("permissions")
        .and_then(|permissions| permissions.get_mut(CAIP25_PERMISSION))
        .and_then(|permission| permission.get_mut("caveats"))
        .and_then(Value::as_array_mut)
    else {
        return 0;
    };

    let mut removed = 0;
    for caveat in caveats {
        if caveat.get("type").and_then(Value::as_str) != Some(CAIP25_CAVEAT) {
            continue;
        }
        let Some(Value::Object(value)) = caveat.get_mut("value") else {
            continue;
        };
        for key in SCOPE_KEYS {
            if let Some(Value::Object(scopes)) = value.get_mut(key) {
                let before = scopes.len();
                scopes.retain(|scope, _| !is_stale(scope, known));
                removed += before - scopes.len();
            }
        }
    }
    removed
}

fn is_stale(scope: &str, known: &BTreeSet<String>) -> bool {
    match scope.strip_prefix("eip155:") {
        Some(reference) if !reference.is_empty() && reference.bytes().all(|b| b.is_ascii_digit()) => {
            !known.contains(reference)
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "m164_stale_chain_scopes_tests.rs"]
mod tests;
