// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 171: seed `NetworkOrderController.enabledNetworkMap` from the token
//! network filter preference.
//!
//! With an EVM network selected only that chain is enabled. With a non-EVM
//! network selected the whole EVM filter carries over and the selected chain
//! is enabled under its own CAIP-2 namespace.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use statemig_core::guard::{self, expect_object, expect_str, type_name, FieldPath};
use statemig_core::{
    atomic, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};

pub struct EnabledNetworkMap;

const EVM_NAMESPACE: &str = "eip155";

#[async_trait]
impl Migration for EnabledNetworkMap {
    fn version(&self) -> Version {
        Version::new(171)
    }

    fn description(&self) -> &'static str {
        "move tokenNetworkFilter into enabledNetworkMap"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let mut next = previous.stamped(self.version());
        atomic(cx, self.version(), &mut next.data, enable_networks);
        Ok(next)
    }
}

fn wrong_type(name: &str, value: Option<&Value>, expected: &str) -> ShapeError {
    ShapeError::invalid(format!(
        "{name} is type '{}', expected {expected}.",
        type_name(value)
    ))
}

/// `Ok(None)` when absent, `Err` when present but not an object.
fn optional_object<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    expected: &str,
) -> Result<Option<&'a Map<String, Value>>, ShapeError> {
    let value = parent.get(key);
    guard::optional_object(value, &FieldPath::root().key(key))
        .map_err(|_| wrong_type(key, value, expected))
}

fn enable_networks(data: &mut Map<String, Value>) -> Result<(), ShapeError> {
    if optional_object(data, "NetworkOrderController", "object in state")?.is_none() {
        tracing::debug!("NetworkOrderController absent, skipping");
        return Ok(());
    }
    let Some(preferences_controller) = optional_object(data, "PreferencesController", "object in state")?
    else {
        tracing::debug!("PreferencesController absent, skipping");
        return Ok(());
    };
    let Some(preferences) =
        optional_object(preferences_controller, "preferences", "object in PreferencesController")?
    else {
        return Ok(());
    };
    let Some(filter) = optional_object(preferences, "tokenNetworkFilter", "object")? else {
        return Ok(());
    };
    if filter.is_empty() {
        return Ok(());
    }

    let multichain_value = data.get("MultichainNetworkController");
    let multichain = expect_object(multichain_value, &FieldPath::controller("MultichainNetworkController"))
        .map_err(|_| wrong_type("MultichainNetworkController", multichain_value, "object in state"))?;
    let selected_value = multichain.get("selectedMultichainNetworkChainId");
    let selected = expect_str(selected_value, &FieldPath::root().key("selectedMultichainNetworkChainId"))
        .map_err(|_| wrong_type("selectedMultichainNetworkChainId", selected_value, "string"))?;
    let evm_selected = multichain.get("isEvmSelected").and_then(Value::as_bool) == Some(true);

    let enabled = if evm_selected {
        json!({ EVM_NAMESPACE: { selected: true } })
    } else {
        let Some((namespace, _)) = selected.split_once(':') else {
            return Err(ShapeError::invalid(format!(
                "selectedMultichainNetworkChainId {selected:?} is not a CAIP-2 chain id."
            )));
        };
        json!({
            EVM_NAMESPACE: filter.clone(),
            namespace: { selected: true },
        })
    };

    if let Some(Value::Object(order)) = data.get_mut("NetworkOrderController") {
        order.insert("enabledNetworkMap".into(), enabled);
    }
    Ok(())
}

#[cfg(test)]
#[path = "m171_enabled_network_map_tests.rs"]
mod tests;
