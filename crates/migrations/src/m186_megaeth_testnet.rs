// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 186: replace MegaETH Testnet v1 with v2.
//!
//! - Adds the v2 network configuration, or merges our endpoint, explorer,
//!   name and currency into one the user already has.
//! - Marks v2 as disabled in the enablement map when it isn't listed yet.
//! - Switches the selection to mainnet when v1 was selected or enabled.
//! - Removes the v1 configuration and its enablement entry.
//!
//! The network controller must be well formed or nothing changes. A corrupt
//! enablement controller is reported and only the enablement part is
//! skipped.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use statemig_core::guard::{is_hex_string, type_name};
use statemig_core::{
    atomic, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};

pub struct MegaEthTestnet;

pub const MEGAETH_TESTNET_V1_CHAIN_ID: &str = "0x18c6";
pub const MEGAETH_TESTNET_V2_CHAIN_ID: &str = "0x18c7";

const V1_NETWORK_CLIENT_ID: &str = "megaeth-testnet";
const V2_NETWORK_CLIENT_ID: &str = "megaeth-testnet-v2";
const V2_NAME: &str = "MegaETH Testnet";
const V2_NATIVE_CURRENCY: &str = "MegaETH";
const V2_RPC_URL: &str = "https://carrot.megaeth.com/rpc";
const V2_BLOCK_EXPLORER_URL: &str = "https://megaeth-testnet-v2.blockscout.com";
const MAINNET_CHAIN_ID: &str = "0x1";
const MAINNET_NETWORK_CLIENT_ID: &str = "mainnet";
const EVM_NAMESPACE: &str = "eip155";

/// The configuration added for users who don't have v2 yet.
pub fn megaeth_testnet_v2() -> Value {
    json!({
        "chainId": MEGAETH_TESTNET_V2_CHAIN_ID,
        "name": V2_NAME,
        "nativeCurrency": V2_NATIVE_CURRENCY,
        "blockExplorerUrls": [V2_BLOCK_EXPLORER_URL],
        "defaultRpcEndpointIndex": 0,
        "defaultBlockExplorerUrlIndex": 0,
        "rpcEndpoints": [{
            "failoverUrls": [],
            "networkClientId": V2_NETWORK_CLIENT_ID,
            "type": "custom",
            "url": V2_RPC_URL,
        }],
    })
}

#[async_trait]
impl Migration for MegaEthTestnet {
    fn version(&self) -> Version {
        Version::new(186)
    }

    fn description(&self) -> &'static str {
        "add MegaETH Testnet v2 and retire v1"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let version = self.version();
        let mut next = previous.stamped(version);
        atomic(cx, version, &mut next.data, |data| {
            replace_testnet(data, cx, version)
        });
        Ok(next)
    }
}

fn invalid_network(reason: impl std::fmt::Display) -> ShapeError {
    ShapeError::invalid(format!("Invalid NetworkController state: {reason}"))
}

fn invalid_enablement(reason: impl std::fmt::Display) -> ShapeError {
    ShapeError::invalid(format!("Invalid NetworkEnablementController state: {reason}"))
}

fn replace_testnet(
    data: &mut Map<String, Value>,
    cx: &MigrationContext,
    version: Version,
) -> Result<(), ShapeError> {
    let selected = validate_network_controller(data)?;
    let Some(Value::Object(network)) = data.get_mut("NetworkController") else {
        return Ok(());
    };
    let selected_v1 = selected == V1_NETWORK_CLIENT_ID
        || network
            .get("networkConfigurationsByChainId")
            .and_then(|configs| configs.get(MEGAETH_TESTNET_V1_CHAIN_ID))
            .is_some_and(|config| has_network_client_id(config, &selected));

    let Some(Value::Object(configs)) = network.get_mut("networkConfigurationsByChainId") else {
        return Ok(());
    };
    match configs.get_mut(MEGAETH_TESTNET_V2_CHAIN_ID) {
        Some(existing) if !is_valid_network_configuration(existing) => {
            tracing::warn!("invalid MegaETH Testnet v2 configuration, skipping");
            return Ok(());
        }
        Some(existing) => merge_testnet_v2(existing, cx),
        None => {
            configs.insert(MEGAETH_TESTNET_V2_CHAIN_ID.into(), megaeth_testnet_v2());
        }
    }

    let switch_to_mainnet = match data.get_mut("NetworkEnablementController") {
        None => {
            tracing::debug!("no NetworkEnablementController, skipping enablement");
            selected_v1
        }
        Some(enablement) => match evm_network_map(enablement) {
            Ok(evm) => update_enablement(evm, selected_v1),
            Err(error) => {
                cx.report(version, error);
                selected_v1
            }
        },
    };

    if let Some(Value::Object(network)) = data.get_mut("NetworkController") {
        if switch_to_mainnet {
            tracing::info!("switching selected network from MegaETH Testnet v1 to mainnet");
            network.insert(
                "selectedNetworkClientId".into(),
                Value::from(MAINNET_NETWORK_CLIENT_ID),
            );
        }
        if let Some(Value::Object(configs)) = network.get_mut("networkConfigurationsByChainId") {
            configs.remove(MEGAETH_TESTNET_V1_CHAIN_ID);
        }
    }
    Ok(())
}

/// Returns the selected network client id.
fn validate_network_controller(data: &Map<String, Value>) -> Result<String, ShapeError> {
    let network = match data.get("NetworkController") {
        None => return Err(invalid_network("missing NetworkController")),
        Some(Value::Object(network)) => network,
        Some(other) => {
            return Err(invalid_network(format_args!(
                "NetworkController state is not an object: '{}'",
                type_name(Some(other))
            )))
        }
    };
    match network.get("networkConfigurationsByChainId") {
        None => return Err(invalid_network("missing networkConfigurationsByChainId property")),
        Some(Value::Object(configs)) if configs.keys().all(|key| is_hex_string(key)) => {}
        Some(_) => {
            return Err(invalid_network(
                "networkConfigurationsByChainId is not an object keyed by hex chain ids",
            ))
        }
    }
    match network.get("selectedNetworkClientId") {
        None => Err(invalid_network("missing selectedNetworkClientId property")),
        Some(Value::String(selected)) => Ok(selected.clone()),
        Some(other) => Err(invalid_network(format_args!(
            "selectedNetworkClientId is not a string: '{}'",
            type_name(Some(other))
        ))),
    }
}

/// Narrow the enablement controller down to its `eip155` map.
fn evm_network_map(enablement: &mut Value) -> Result<&mut Map<String, Value>, ShapeError> {
    let actual = type_name(Some(&*enablement));
    let Value::Object(enablement) = enablement else {
        return Err(invalid_enablement(format_args!("'{actual}'")));
    };
    let map = match enablement.get_mut("enabledNetworkMap") {
        None => return Err(invalid_enablement("missing property enabledNetworkMap.")),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(invalid_enablement(format_args!(
                "NetworkEnablementController.enabledNetworkMap is not an object: {}.",
                type_name(Some(&*other))
            )))
        }
    };
    match map.get_mut(EVM_NAMESPACE) {
        None => Err(invalid_enablement(
            "NetworkEnablementController.enabledNetworkMap missing property eip155.",
        )),
        Some(Value::Object(evm)) if evm.values().all(Value::is_boolean) => Ok(evm),
        Some(_) => Err(invalid_enablement(
            "NetworkEnablementController.enabledNetworkMap.eip155 is not a valid enabledNetworkMap.",
        )),
    }
}

/// Returns whether the selection must move to mainnet.
fn update_enablement(evm: &mut Map<String, Value>, selected_v1: bool) -> bool {
    evm.entry(MEGAETH_TESTNET_V2_CHAIN_ID)
        .or_insert(Value::Bool(false));
    let v1_enabled = evm.get(MEGAETH_TESTNET_V1_CHAIN_ID) == Some(&Value::Bool(true));
    let switch = v1_enabled || selected_v1;
    if switch {
        evm.insert(MAINNET_CHAIN_ID.into(), Value::Bool(true));
    }
    evm.remove(MEGAETH_TESTNET_V1_CHAIN_ID);
    switch
}

fn merge_testnet_v2(existing: &mut Value, cx: &MigrationContext) {
    let Value::Object(config) = existing else {
        return;
    };
    config.insert("name".into(), Value::from(V2_NAME));
    config.insert("nativeCurrency".into(), Value::from(V2_NATIVE_CURRENCY));

    if let Some(Value::Array(endpoints)) = config.get_mut("rpcEndpoints") {
        let present = endpoints
            .iter()
            .any(|endpoint| endpoint.get("url").and_then(Value::as_str) == Some(V2_RPC_URL));
        if !present {
            endpoints.push(json!({
                "failoverUrls": [],
                "networkClientId": cx.next_id(),
                "type": "custom",
                "url": V2_RPC_URL,
            }));
            let index = endpoints.len() - 1;
            config.insert("defaultRpcEndpointIndex".into(), Value::from(index));
        }
    }

    if let Some(Value::Array(urls)) = config.get_mut("blockExplorerUrls") {
        if !urls.iter().any(|url| url.as_str() == Some(V2_BLOCK_EXPLORER_URL)) {
            urls.push(Value::from(V2_BLOCK_EXPLORER_URL));
            let index = urls.len() - 1;
            config.insert("defaultBlockExplorerUrlIndex".into(), Value::from(index));
        }
    }
}

fn is_valid_rpc_endpoint(endpoint: &Value) -> bool {
    endpoint.get("networkClientId").is_some_and(Value::is_string)
        && endpoint.get("url").is_some_and(Value::is_string)
}

fn is_valid_network_configuration(config: &Value) -> bool {
    let Value::Object(config) = config else {
        return false;
    };
    let string = |key: &str| config.get(key).is_some_and(Value::is_string);
    let chain_id_ok = config
        .get("chainId")
        .and_then(Value::as_str)
        .is_some_and(is_hex_string);
    let endpoints_ok = matches!(
        config.get("rpcEndpoints"),
        Some(Value::Array(endpoints)) if endpoints.iter().all(is_valid_rpc_endpoint)
    );
    let explorers_ok = matches!(
        config.get("blockExplorerUrls"),
        Some(Value::Array(urls)) if urls.iter().all(Value::is_string)
    );
    let explorer_index_ok = config
        .get("defaultBlockExplorerUrlIndex")
        .is_none_or(Value::is_number);

    chain_id_ok
        && endpoints_ok
        && string("name")
        && string("nativeCurrency")
        && explorers_ok
        && config.get("defaultRpcEndpointIndex").is_some_and(Value::is_number)
        && explorer_index_ok
}

fn has_network_client_id(config: &Value, network_client_id: &str) -> bool {
    is_valid_network_configuration(config)
        && config
            .get("rpcEndpoints")
            .and_then(Value::as_array)
            .is_some_and(|endpoints| {
                endpoints.iter().any(|endpoint| {
                    endpoint.get("networkClientId").and_then(Value::as_str)
                        == Some(network_client_id)
                })
            })
}

#[cfg(test)]
#[path = "m186_megaeth_testnet_tests.rs"]
mod tests;
