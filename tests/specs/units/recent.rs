//! Recent network migration specs
//!
//! One realistic document taken from version 156 through the rest of the
//! chain: failover URLs, permission scopes, network enablement, bridge
//! history and the MegaETH testnet swap.

use crate::prelude::*;

const LINEA_FAILOVER: &str = "https://example.quicknode.com/linea-mainnet";
const SOLANA_ID: &str = "4731011b-c021-46c8-9dbd-706d21ef6709";
const SOLANA_HASH: &str = "5Cs9btTX3G7a4H4mmbuYLPpEzyyj2t64aSnCCMyy1AKQZvBrLprbmcT7TF2mcTQNKGik9JTLRkqHTtkKjHUUi4af";

fn context() -> MigrationContext {
    MigrationContext::new().with_config(
        MigratorConfig::default()
            .with_infura_project_id("project-id")
            .with_failover_url("linea-mainnet", LINEA_FAILOVER),
    )
}

fn infura_network(chain_id: &str, name: &str, client: &str) -> Value {
    json!({
        "chainId": chain_id,
        "name": name,
        "nativeCurrency": "ETH",
        "blockExplorerUrls": [],
        "defaultRpcEndpointIndex": 0,
        "rpcEndpoints": [{
            "networkClientId": client,
            "type": "infura",
            "url": format!("https://{client}.infura.io/v3/{{infuraProjectId}}"),
        }],
    })
}

fn megaeth_v1() -> Value {
    json!({
        "chainId": "0x18c6",
        "name": "Mega Testnet",
        "nativeCurrency": "MegaETH",
        "blockExplorerUrls": ["https://megaexplorer.xyz"],
        "defaultRpcEndpointIndex": 0,
        "rpcEndpoints": [{ "networkClientId": "megaeth-testnet", "type": "custom", "url": "https://timothy.megaeth.com/rpc" }],
    })
}

fn solana_bridge_item(tx_meta_id: &str) -> Value {
    json!({
        "quote": { "srcChainId": 1_151_111_081_099_710_u64, "destChainId": 1_151_111_081_099_710_u64 },
        "status": { "srcChain": { "chainId": 1_151_111_081_099_710_u64, "txHash": SOLANA_HASH }, "status": "PENDING" },
        "txMetaId": tx_meta_id,
    })
}

fn subject(optional_scopes: Value) -> Value {
    json!({
        "origin": "https://example.com",
        "permissions": {
            "endowment:caip25": {
                "caveats": [{
                    "type": "authorizedScopes",
                    "value": { "requiredScopes": {}, "optionalScopes": optional_scopes, "isMultichainOrigin": false },
                }],
            },
        },
    })
}

#[tokio::test]
async fn document_from_156_reaches_latest_schema() {
    let chain = Chain::with_context(context());
    let document = stored(
        v(156),
        json!({
            "NetworkController": {
                "selectedNetworkClientId": "megaeth-testnet",
                "networkConfigurationsByChainId": {
                    "0x1": infura_network("0x1", "Ethereum Mainnet", "mainnet"),
                    "0xe708": infura_network("0xe708", "Linea", "linea-mainnet"),
                    "0x18c6": megaeth_v1(),
                },
            },
            "PermissionController": { "subjects": { "https://example.com": subject(json!({
                "eip155:1": { "accounts": [] },
                "eip155:59144": { "accounts": [] },
                "eip155:10": { "accounts": [] },
                "wallet:eip155": { "accounts": [] },
            })) } },
            "NetworkOrderController": {},
            "PreferencesController": { "preferences": { "tokenNetworkFilter": { "0x1": true, "0xe708": true } } },
            "MultichainNetworkController": { "selectedMultichainNetworkChainId": "0x1", "isEvmSelected": true },
            "BridgeStatusController": { "txHistory": { SOLANA_ID: solana_bridge_item(SOLANA_ID) } },
            "AccountsController": { "untouched": true },
        }),
    );

    let run = chain.registry().run(document, chain.cx()).await.unwrap();

    let mut linea = infura_network("0xe708", "Linea", "linea-mainnet");
    linea["rpcEndpoints"][0]["failoverUrls"] = json!([LINEA_FAILOVER]);
    let megaeth_v2 = statemig_migrations::m186_megaeth_testnet::megaeth_testnet_v2();

    similar_asserts::assert_eq!(
        data_of(&run.document),
        json!({
            "NetworkController": {
                "selectedNetworkClientId": "mainnet",
                "networkConfigurationsByChainId": {
                    "0x1": infura_network("0x1", "Ethereum Mainnet", "mainnet"),
                    "0xe708": linea,
                    "0x18c7": megaeth_v2,
                },
            },
            "PermissionController": { "subjects": { "https://example.com": subject(json!({
                "eip155:1": { "accounts": [] },
                "eip155:59144": { "accounts": [] },
                "wallet:eip155": { "accounts": [] },
            })) } },
            "NetworkOrderController": { "enabledNetworkMap": { "eip155": { "0x1": true } } },
            "PreferencesController": { "preferences": { "tokenNetworkFilter": { "0x1": true, "0xe708": true } } },
            "MultichainNetworkController": { "selectedMultichainNetworkChainId": "0x1", "isEvmSelected": true },
            "BridgeStatusController": { "txHistory": { SOLANA_HASH: solana_bridge_item(SOLANA_HASH) } },
            "AccountsController": { "untouched": true },
        })
    );
    assert_eq!(run.applied, vec![v(157), v(164), v(171), v(174), v(186)]);
    assert_eq!(
        run.changed_controllers.into_iter().collect::<Vec<_>>(),
        [
            "BridgeStatusController",
            "NetworkController",
            "NetworkOrderController",
            "PermissionController",
        ]
    );
    assert!(chain.reports().is_empty(), "{:?}", chain.reports());
}

#[tokio::test]
async fn missing_infura_project_id_skips_failover_only() {
    let chain = Chain::new();
    let document = stored(
        v(156),
        json!({
            "NetworkController": {
                "selectedNetworkClientId": "mainnet",
                "networkConfigurationsByChainId": {
                    "0xe708": infura_network("0xe708", "Linea", "linea-mainnet"),
                },
            },
        }),
    );

    let migrated = chain.migrate(document).await;

    let configs = &migrated.data["NetworkController"]["networkConfigurationsByChainId"];
    assert!(configs["0xe708"]["rpcEndpoints"][0].get("failoverUrls").is_none());
    assert!(configs.get("0x18c7").is_some());
    assert_eq!(chain.reports(), ["Migration 157: No INFURA_PROJECT_ID set!"]);
}

#[tokio::test]
async fn legacy_grants_become_scopes_and_lose_deleted_chains() {
    let chain = Chain::with_context(context());
    let document = stored(
        v(127),
        json!({
            "NetworkController": {
                "selectedNetworkClientId": "mainnet",
                "networkConfigurations": { "base": { "chainId": "0x2105" } },
                "networkConfigurationsByChainId": {
                    "0x1": infura_network("0x1", "Ethereum Mainnet", "mainnet"),
                },
            },
            "SelectedNetworkController": { "domains": { "https://example.com": "base" } },
            "PermissionController": { "subjects": { "https://example.com": {
                "origin": "https://example.com",
                "permissions": {
                    "eth_accounts": { "caveats": [{ "type": "restrictReturnedAccounts", "value": ["0x123"] }] },
                    "endowment:permitted-chains": {
                        "caveats": [{ "type": "restrictNetworkSwitching", "value": ["0x1", "0x2105"] }],
                    },
                },
            }}},
        }),
    );

    let migrated = chain.migrate_to(document, v(164)).await;

    let data = data_of(&migrated);
    let permissions = &data["PermissionController"]["subjects"]["https://example.com"]["permissions"];
    assert!(permissions.get("eth_accounts").is_none());
    assert!(permissions.get("endowment:permitted-chains").is_none());
    let scopes = &permissions["endowment:caip25"]["caveats"][0]["value"]["optionalScopes"];
    let names: Vec<&str> = scopes
        .as_object()
        .map(|scopes| scopes.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(names, ["eip155:1"]);
    assert_eq!(scopes["eip155:1"]["accounts"], json!(["eip155:1:0x123"]));
}
