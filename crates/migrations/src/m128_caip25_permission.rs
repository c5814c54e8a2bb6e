// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 128: fold `eth_accounts` and `endowment:permitted-chains` grants into a
//! single CAIP-25 permission per subject.
//!
//! The subject's accounts are authorized on every chain it was allowed to
//! switch to. Without a permitted-chains grant it gets the chain its domain
//! was pinned to in `SelectedNetworkController.domains`, falling back to the
//! globally selected chain.
//!
//! Any malformed subject abandons the whole conversion: a partially converted
//! `subjects` map would leave some origins with both permission layouts.

use crate::chain_id::hex_to_decimal;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use statemig_core::guard::{expect_object, expect_object_mut, expect_str, type_name, FieldPath};
use statemig_core::{
    atomic, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};
use std::collections::BTreeMap;

pub struct Caip25Permission;

const ETH_ACCOUNTS: &str = "eth_accounts";
const PERMITTED_CHAINS: &str = "endowment:permitted-chains";
const CAIP25_PERMISSION: &str = "endowment:caip25";
const CAIP25_CAVEAT: &str = "authorizedScopes";
const ACCOUNTS_CAVEAT: &str = "restrictReturnedAccounts";
const CHAINS_CAVEAT: &str = "restrictNetworkSwitching";
const CONTROLLERS: [&str; 3] =
    ["PermissionController", "NetworkController", "SelectedNetworkController"];

/// Network client ids that never appear in `networkConfigurations`.
const BUILT_IN_NETWORKS: [(&str, &str); 6] = [
    ("mainnet", "0x1"),
    ("goerli", "0x5"),
    ("sepolia", "0xaa36a7"),
    ("linea-goerli", "0xe704"),
    ("linea-sepolia", "0xe705"),
    ("linea-mainnet", "0xe708"),
];

const NOTIFICATIONS: [&str; 3] = ["accountsChanged", "chainChanged", "eth_subscription"];

/// Methods an EVM scope grants.
const RPC_METHODS: [&str; 52] = [
    "wallet_addEthereumChain",
    "wallet_switchEthereumChain",
    "wallet_getPermissions",
    "wallet_requestPermissions",
    "wallet_revokePermissions",
    "personal_sign",
    "eth_signTypedData_v4",
    "wallet_registerOnboarding",
    "wallet_watchAsset",
    "wallet_scanQRCode",
    "eth_requestAccounts",
    "eth_accounts",
    "eth_sendTransaction",
    "eth_decrypt",
    "eth_getEncryptionPublicKey",
    "web3_clientVersion",
    "eth_subscribe",
    "eth_unsubscribe",
    "eth_blobBaseFee",
    "eth_blockNumber",
    "eth_call",
    "eth_chainId",
    "eth_coinbase",
    "eth_estimateGas",
    "eth_feeHistory",
    "eth_gasPrice",
    "eth_getBalance",
    "eth_getBlockByHash",
    "eth_getBlockByNumber",
    "eth_getBlockReceipts",
    "eth_getBlockTransactionCountByHash",
    "eth_getBlockTransactionCountByNumber",
    "eth_getCode",
    "eth_getFilterChanges",
    "eth_getFilterLogs",
    "eth_getLogs",
    "eth_getProof",
    "eth_getStorageAt",
    "eth_getTransactionByBlockHashAndIndex",
    "eth_getTransactionByBlockNumberAndIndex",
    "eth_getTransactionByHash",
    "eth_getTransactionCount",
    "eth_getTransactionReceipt",
    "eth_getUncleCountByBlockHash",
    "eth_getUncleCountByBlockNumber",
    "eth_maxPriorityFeePerGas",
    "eth_newBlockFilter",
    "eth_newFilter",
    "eth_newPendingTransactionFilter",
    "eth_sendRawTransaction",
    "eth_syncing",
    "eth_uninstallFilter",
];

#[async_trait]
impl Migration for Caip25Permission {
    fn version(&self) -> Version {
        Version::new(128)
    }

    fn description(&self) -> &'static str {
        "replace eth_accounts and permitted-chains with a CAIP-25 permission"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let mut next = previous.stamped(self.version());
        if let Some(absent) = CONTROLLERS.iter().find(|name| !next.data.contains_key(**name)) {
            tracing::debug!(controller = *absent, "controller absent, skipping");
            return Ok(next);
        }
        atomic(cx, self.version(), &mut next.data, convert_subjects);
        Ok(next)
    }
}

/// Where each origin's accounts end up when it has no permitted-chains grant.
struct ChainResolver {
    selected: String,
    by_origin: BTreeMap<String, String>,
}

impl ChainResolver {
    fn from_state(data: &Map<String, Value>) -> Result<Self, ShapeError> {
        let permission_path = FieldPath::controller("PermissionController");
        let network_path = FieldPath::controller("NetworkController");
        let selected_path = FieldPath::controller("SelectedNetworkController");

        let permission = expect_object(data.get("PermissionController"), &permission_path)?;
        let network = expect_object(data.get("NetworkController"), &network_path)?;
        let selected_network =
            expect_object(data.get("SelectedNetworkController"), &selected_path)?;
        expect_object(permission.get("subjects"), &permission_path.key("subjects"))?;

        let client_path = network_path.key("selectedNetworkClientId");
        let client = expect_str(network.get("selectedNetworkClientId"), &client_path)?;
        if client.is_empty() {
            return Err(ShapeError::invalid_entry(client_path, "expected a non-empty string"));
        }
        let configurations = expect_object(
            network.get("networkConfigurations"),
            &network_path.key("networkConfigurations"),
        )?;
        let domains = expect_object(selected_network.get("domains"), &selected_path.key("domains"))?;

        let selected = match chain_for_client(client, configurations) {
            Some(chain) => chain.to_string(),
            None => {
                let chain_id = configurations.get(client).and_then(|config| config.get("chainId"));
                return Err(ShapeError::invalid(format!(
                    "Invalid chainId for selectedNetworkClientId \"{client}\" of type {}",
                    type_name(chain_id)
                )));
            }
        };

        let by_origin = domains
            .iter()
            .filter_map(|(origin, client)| {
                let chain = chain_for_client(client.as_str()?, configurations)?;
                Some((origin.clone(), chain.to_string()))
            })
            .collect();
        Ok(Self { selected, by_origin })
    }

    fn chain_for(&self, origin: &str) -> &str {
        self.by_origin.get(origin).unwrap_or(&self.selected)
    }
}

fn chain_for_client<'a>(client: &str, configurations: &'a Map<String, Value>) -> Option<&'a str> {
    if let Some((_, chain)) = BUILT_IN_NETWORKS.iter().find(|(id, _)| *id == client) {
        return Some(*chain);
    }
    configurations.get(client)?.get("chainId")?.as_str()
}

fn convert_subjects(data: &mut Map<String, Value>) -> Result<(), ShapeError> {
    let resolver = ChainResolver::from_state(data)?;

    let path = FieldPath::controller("PermissionController");
    let controller = expect_object_mut(data.get_mut("PermissionController"), &path)?;
    let subjects = expect_object_mut(controller.get_mut("subjects"), &path.key("subjects"))?;

    for (origin, subject) in subjects.iter_mut() {
        let subject = match subject {
            Value::Object(subject) => subject,
            other => {
                return Err(ShapeError::invalid(format!(
                    "Invalid subject for origin \"{origin}\" of type {}",
                    type_name(Some(&*other))
                )));
            }
        };
        let permissions = match subject.get_mut("permissions") {
            Some(Value::Object(permissions)) => permissions,
            other => {
                return Err(ShapeError::invalid(format!(
                    "Invalid permissions for origin \"{origin}\" of type {}",
                    type_name(other.as_deref())
                )));
            }
        };

        let permitted = permissions.remove(PERMITTED_CHAINS);
        let Some(accounts_permission) = permissions.remove(ETH_ACCOUNTS) else {
            continue;
        };

        let mut chains = caveat_strings(permitted.as_ref(), CHAINS_CAVEAT);
        if chains.is_empty() {
            chains.push(resolver.chain_for(origin).to_string());
        }
        let accounts = caveat_strings(Some(&accounts_permission), ACCOUNTS_CAVEAT);
        let scopes = optional_scopes(origin, &chains, &accounts)?;

        let mut permission = match accounts_permission {
            Value::Object(permission) => permission,
            _ => Map::new(),
        };
        permission.insert("parentCapability".into(), json!(CAIP25_PERMISSION));
        permission.insert(
            "caveats".into(),
            json!([{
                "type": CAIP25_CAVEAT,
                "value": {
                    "requiredScopes": {},
                    "optionalScopes": scopes,
                    "isMultichainOrigin": false,
                },
            }]),
        );
        permissions.insert(CAIP25_PERMISSION.into(), Value::Object(permission));
        tracing::debug!(%origin, chains = chains.len(), "granted CAIP-25 permission");
    }
    Ok(())
}

/// String entries of the first caveat of type `caveat_type`.
fn caveat_strings(permission: Option<&Value>, caveat_type: &str) -> Vec<String> {
    permission
        .and_then(|permission| permission.get("caveats"))
        .and_then(Value::as_array)
        .and_then(|caveats| {
            caveats
                .iter()
                .find(|caveat| caveat.get("type").and_then(Value::as_str) == Some(caveat_type))
        })
        .and_then(|caveat| caveat.get("value"))
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn optional_scopes(
    origin: &str,
    chains: &[String],
    accounts: &[String],
) -> Result<Map<String, Value>, ShapeError> {
    let mut scopes = Map::new();
    for chain in chains {
        let Some(reference) = hex_to_decimal(chain) else {
            return Err(ShapeError::invalid(format!(
                "Invalid chainId {chain:?} for origin \"{origin}\""
            )));
        };
        let scope = format!("eip155:{reference}");
        let accounts: Vec<String> =
            accounts.iter().map(|account| format!("{scope}:{account}")).collect();
        scopes.insert(
            scope,
            json!({
                "accounts": accounts,
                "methods": RPC_METHODS.as_slice(),
                "notifications": NOTIFICATIONS.as_slice(),
            }),
        );
    }
    Ok(scopes)
}

#[cfg(test)]
#[path = "m128_caip25_permission_tests.rs"]
mod tests;
