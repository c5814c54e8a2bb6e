// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 120.2: remove obsolete controller state.
//!
//! Each controller is cleaned independently; corruption in one does not
//! stop the others.

use async_trait::async_trait;
use serde_json::{Map, Value};
use statemig_core::guard::type_name;
use statemig_core::{
    isolated, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};

pub struct ObsoleteState;

const OBSOLETE_NETWORK_PROPERTIES: [&str; 5] = [
    "networkDetails",
    "networkId",
    "networkStatus",
    "previousProviderStore",
    "provider",
];

#[async_trait]
impl Migration for ObsoleteState {
    fn version(&self) -> Version {
        Version::point(120, 2)
    }

    fn description(&self) -> &'static str {
        "remove obsolete controller state"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let version = self.version();
        let mut next = previous.stamped(version);
        let data = &mut next.data;

        remove_selected_network_controller(data);
        isolated(cx, version, data, snap_controller);
        isolated(cx, version, data, network_controller);
        isolated(cx, version, data, phishing_controller);

        Ok(next)
    }
}

fn invalid(what: &str, value: &Value) -> ShapeError {
    ShapeError::invalid(format!(
        "Invalid {what} state of type '{}'",
        type_name(Some(value))
    ))
}

/// The whole controller is obsolete if it is corrupt or still uses the
/// per-domain layout.
fn remove_selected_network_controller(data: &mut Map<String, Value>) {
    let obsolete = match data.get("SelectedNetworkController") {
        None => false,
        Some(Value::Object(controller)) => controller.contains_key("perDomainNetwork"),
        Some(_) => true,
    };
    if obsolete {
        tracing::debug!("removing SelectedNetworkController");
        data.remove("SelectedNetworkController");
    }
}

fn snap_controller(data: &mut Map<String, Value>) -> Result<(), ShapeError> {
    match data.get_mut("SnapController") {
        None => Ok(()),
        Some(Value::Object(controller)) => {
            controller.remove("snapErrors");
            Ok(())
        }
        Some(other) => Err(invalid("SnapController", other)),
    }
}

fn network_controller(data: &mut Map<String, Value>) -> Result<(), ShapeError> {
    let controller = match data.get_mut("NetworkController") {
        None => return Ok(()),
        Some(Value::Object(controller)) => controller,
        Some(other) => return Err(invalid("NetworkController", other)),
    };

    // Validate everything before touching anything.
    match controller.get("providerConfig") {
        None | Some(Value::Null | Value::Object(_)) => {}
        Some(other) => return Err(invalid("NetworkController providerConfig", other)),
    }
    match controller.get("networkConfigurations") {
        None | Some(Value::Object(_)) => {}
        Some(other) => return Err(invalid("NetworkController networkConfigurations", other)),
    }

    for key in OBSOLETE_NETWORK_PROPERTIES {
        controller.remove(key);
    }

    let dangling = match controller.get("providerConfig").and_then(|config| config.get("id")) {
        None => false,
        Some(Value::String(id)) => !controller
            .get("networkConfigurations")
            .is_some_and(|configs| configs.get(id.as_str()).is_some()),
        Some(_) => true,
    };
    if dangling {
        if let Some(Value::Object(config)) = controller.get_mut("providerConfig") {
            config.remove("id");
        }
    }
    Ok(())
}

fn phishing_controller(data: &mut Map<String, Value>) -> Result<(), ShapeError> {
    match data.get_mut("PhishingController") {
        None => Ok(()),
        Some(Value::Object(controller)) => {
            controller.remove("listState");
            Ok(())
        }
        Some(other) => Err(invalid("PhishingController", other)),
    }
}

#[cfg(test)]
#[path = "m120_2_obsolete_state_tests.rs"]
mod tests;
