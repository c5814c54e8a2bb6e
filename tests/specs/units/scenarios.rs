//! Encoding and rekeying specs
//!
//! The two canonical transform shapes: retyping a field in place and
//! promoting an array into an id-keyed object.

use crate::prelude::*;

#[tokio::test]
async fn stringified_zero_decimals_become_numbers() {
    let chain = Chain::new();
    let migrated = chain
        .migrate_to(
            stored(
                v(53),
                json!({ "PreferencesController": { "tokens": [{ "address": "a", "decimals": "0", "symbol": "X" }] } }),
            ),
            v(54),
        )
        .await;

    assert_eq!(
        data_of(&migrated),
        json!({ "PreferencesController": { "tokens": [{ "address": "a", "decimals": 0, "symbol": "X" }] } })
    );
    assert!(chain.reports().is_empty());
}

#[tokio::test]
async fn unparsable_decimals_drop_the_token() {
    let chain = Chain::new();
    let migrated = chain
        .migrate_to(
            stored(
                v(53),
                json!({ "PreferencesController": { "tokens": [{ "address": "a", "decimals": "not_a_number", "symbol": "X" }] } }),
            ),
            v(54),
        )
        .await;

    assert_eq!(data_of(&migrated), json!({ "PreferencesController": { "tokens": [] } }));
    let reports = chain.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("Migration 54: state.PreferencesController.tokens[0]"), "{reports:?}");
}

#[tokio::test]
async fn rpc_list_is_promoted_to_id_keyed_configurations() {
    let chain = Chain::with_context(MigrationContext::new().with_id_gen(FixedIdGen::new("id-1")));
    let migrated = chain
        .migrate_to(
            stored(
                v(81),
                json!({ "PreferencesController": { "frequentRpcListDetail": [{ "chainId": "0x1", "nickname": "N" }] } }),
            ),
            v(82),
        )
        .await;

    similar_asserts::assert_eq!(
        data_of(&migrated),
        json!({
            "NetworkController": { "networkConfigurations": { "id-1": { "chainId": "0x1", "nickname": "N" } } },
            "PreferencesController": {},
        })
    );
    assert!(chain.reports().is_empty());
}

#[tokio::test]
async fn promoted_configurations_then_get_client_metadata() {
    let chain = Chain::with_context(MigrationContext::new().with_id_gen(FixedIdGen::new("id-1")));
    let migrated = chain
        .migrate_to(
            stored(
                v(81),
                json!({
                    "PreferencesController": { "frequentRpcListDetail": [] },
                    "NetworkController": {
                        "providerConfig": { "type": "mainnet", "chainId": "0x1" },
                        "networkStatus": "available",
                        "networkDetails": { "EIPS": { "1559": true } },
                    },
                }),
            ),
            v(94),
        )
        .await;

    similar_asserts::assert_eq!(
        data_of(&migrated),
        json!({
            "PreferencesController": {},
            "NetworkController": {
                "providerConfig": { "type": "mainnet", "chainId": "0x1" },
                "networkConfigurations": {},
                "networksMetadata": { "mainnet": { "EIPS": { "1559": true }, "status": "available" } },
                "selectedNetworkClientId": "mainnet",
            },
        })
    );
}
