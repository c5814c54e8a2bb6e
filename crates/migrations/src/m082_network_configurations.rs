// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 82: custom RPC list becomes an id-keyed map on the network controller.
//!
//! `PreferencesController.frequentRpcListDetail` (an array) is replaced by
//! `NetworkController.networkConfigurations`, keyed by freshly generated
//! ids in list order. Only the whitelisted fields are carried over.

use async_trait::async_trait;
use serde_json::{Map, Value};
use statemig_core::guard::{expect_object_mut, has_property, is_object, type_name, FieldPath};
use statemig_core::{
    atomic, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};

pub struct NetworkConfigurations;

const CARRIED_FIELDS: [&str; 5] = ["chainId", "nickname", "rpcPrefs", "rpcUrl", "ticker"];

#[async_trait]
impl Migration for NetworkConfigurations {
    fn version(&self) -> Version {
        Version::new(82)
    }

    fn description(&self) -> &'static str {
        "move frequentRpcListDetail to NetworkController.networkConfigurations"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let mut next = previous.stamped(self.version());
        if !next.data.contains_key("PreferencesController") {
            tracing::debug!("no PreferencesController, nothing to move");
            return Ok(next);
        }
        atomic(cx, self.version(), &mut next.data, |data| promote(data, cx));
        Ok(next)
    }
}

fn promote(data: &mut Map<String, Value>, cx: &MigrationContext) -> Result<(), ShapeError> {
    let prefs_path = FieldPath::controller("PreferencesController");
    let list_path = prefs_path.key("frequentRpcListDetail");
    let network_path = FieldPath::controller("NetworkController");

    let prefs = expect_object_mut(data.get_mut("PreferencesController"), &prefs_path)?;
    let list = match prefs.get("frequentRpcListDetail") {
        Some(Value::Array(list)) => list.clone(),
        other => {
            let actual = type_name(other);
            // Nothing to move when the configurations already exist.
            let migrated = data
                .get("NetworkController")
                .is_some_and(|network| has_property(network, "networkConfigurations"));
            if migrated {
                return Ok(());
            }
            return Err(ShapeError::WrongType {
                path: list_path.to_string(),
                expected: "array",
                actual,
            });
        }
    };

    if let Some(bad) = list.iter().find(|entry| !is_object(entry)) {
        return Err(ShapeError::invalid(format!(
            "{list_path} contains an element of type {}",
            type_name(Some(bad))
        )));
    }

    let mut configurations = Map::new();
    for entry in &list {
        let carried: Map<String, Value> = CARRIED_FIELDS
            .iter()
            .filter_map(|field| entry.get(*field).map(|v| ((*field).to_string(), v.clone())))
            .collect();
        configurations.insert(cx.next_id(), Value::Object(carried));
    }

    let network = data
        .entry("NetworkController")
        .or_insert_with(|| Value::Object(Map::new()));
    let network = expect_object_mut(Some(network), &network_path)?;
    network.insert("networkConfigurations".into(), Value::Object(configurations));

    if let Some(Value::Object(prefs)) = data.get_mut("PreferencesController") {
        prefs.remove("frequentRpcListDetail");
    }
    Ok(())
}

#[cfg(test)]
#[path = "m082_network_configurations_tests.rs"]
mod tests;
