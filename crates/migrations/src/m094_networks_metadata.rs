// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 94: per-network metadata keyed by network client id.
//!
//! `networkStatus` and `networkDetails` describe the selected network only.
//! They move into `networksMetadata[<client id>]` and the client id is
//! recorded as `selectedNetworkClientId`. The client id is
//! `providerConfig.id`, or `providerConfig.type` for built-in networks.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use statemig_core::guard::{expect_object, expect_object_mut, type_name, FieldPath};
use statemig_core::{
    atomic, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};

pub struct NetworksMetadata;

const RPC_TYPE: &str = "rpc";
const UNKNOWN_STATUS: &str = "unknown";

#[async_trait]
impl Migration for NetworksMetadata {
    fn version(&self) -> Version {
        Version::new(94)
    }

    fn description(&self) -> &'static str {
        "move network status and details into networksMetadata"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let mut next = previous.stamped(self.version());
        if !next.data.contains_key("NetworkController") {
            tracing::warn!("typeof state.NetworkController is undefined");
            return Ok(next);
        }
        atomic(cx, self.version(), &mut next.data, move_metadata);
        Ok(next)
    }
}

fn move_metadata(data: &mut Map<String, Value>) -> Result<(), ShapeError> {
    let path = FieldPath::controller("NetworkController");
    let network = expect_object_mut(data.get_mut("NetworkController"), &path)?;
    let config_path = path.key("providerConfig");
    let provider = expect_object(network.get("providerConfig"), &config_path)?;

    let client_id = match (provider.get("id"), provider.get("type")) {
        (Some(Value::String(id)), _) => id.clone(),
        (Some(other), _) => {
            return Err(ShapeError::WrongType {
                path: config_path.key("id").to_string(),
                expected: "string",
                actual: type_name(Some(other)),
            })
        }
        (None, Some(Value::String(kind))) if kind != RPC_TYPE => kind.clone(),
        (None, kind) => {
            let kind = match kind {
                Some(Value::String(s)) => s.clone(),
                other => type_name(other).to_string(),
            };
            return Err(ShapeError::invalid(format!(
                "typeof {config_path}.id is undefined and {config_path}.type is {kind}"
            )));
        }
    };

    let status = network
        .remove("networkStatus")
        .unwrap_or_else(|| Value::from(UNKNOWN_STATUS));
    let eips = network
        .remove("networkDetails")
        .and_then(|details| details.get("EIPS").cloned())
        .unwrap_or_else(|| json!({}));

    let mut metadata = Map::new();
    metadata.insert(client_id.clone(), json!({ "EIPS": eips, "status": status }));
    network.insert("networksMetadata".into(), Value::Object(metadata));
    network.insert("selectedNetworkClientId".into(), Value::from(client_id));
    Ok(())
}

#[cfg(test)]
#[path = "m094_networks_metadata_tests.rs"]
mod tests;
