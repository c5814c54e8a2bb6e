//! Corruption tolerance specs
//!
//! Verify that malformed state never stops the chain, is reported, and is
//! passed through untouched.

use crate::prelude::*;

#[tokio::test]
async fn corrupt_controller_is_reported_and_passed_through() {
    let chain = Chain::new();
    let migrated = chain
        .migrate(stored(v(53), json!({ "PreferencesController": "corrupt" })))
        .await;

    assert_eq!(migrated.version(), Some(v(186)));
    assert_eq!(data_of(&migrated), json!({ "PreferencesController": "corrupt" }));
    assert_eq!(
        chain.reports(),
        [
            "Migration 54: typeof state.PreferencesController is string",
            "Migration 82: typeof state.PreferencesController is string",
            "Migration 157: No INFURA_PROJECT_ID set!",
            "Migration 186: Invalid NetworkController state: missing NetworkController",
        ]
    );
}

#[tokio::test]
async fn one_bad_token_does_not_cost_the_others() {
    let chain = Chain::new();
    let migrated = chain
        .migrate_to(
            stored(
                v(53),
                json!({
                    "PreferencesController": {
                        "tokens": [
                            { "address": "a", "decimals": "18", "symbol": "A" },
                            { "address": "b", "decimals": "", "symbol": "B" },
                            { "address": "c", "decimals": "6", "symbol": "C" },
                        ],
                    },
                }),
            ),
            v(54),
        )
        .await;

    similar_asserts::assert_eq!(
        data_of(&migrated),
        json!({
            "PreferencesController": {
                "tokens": [
                    { "address": "a", "decimals": 18, "symbol": "A" },
                    { "address": "c", "decimals": 6, "symbol": "C" },
                ],
            },
        })
    );
    assert_eq!(chain.reports().len(), 1);
}

#[tokio::test]
async fn caller_document_is_never_modified() {
    let chain = Chain::new();
    let original = stored(
        v(63),
        json!({
            "TransactionController": {
                "transactions": { "1": { "type": "sentEther", "history": [{ "type": "sentEther" }] } },
            },
        }),
    );
    let snapshot = original.clone();

    for unit in statemig_migrations::all() {
        let next = unit.migrate(&original, chain.cx()).await.unwrap();
        assert_eq!(next.version(), Some(unit.version()));
    }

    assert_eq!(original, snapshot);
}

#[tokio::test]
async fn every_unit_stamps_its_version_on_garbage() {
    let chain = Chain::new();
    let garbage = stored(
        None,
        json!({
            "NetworkController": [1, 2, 3],
            "PreferencesController": null,
            "TokensController": 7,
            "PermissionController": "x",
            "BridgeStatusController": { "txHistory": [] },
        }),
    );

    for unit in statemig_migrations::all() {
        let next = unit.migrate(&garbage, chain.cx()).await.unwrap();
        assert_eq!(next.version(), Some(unit.version()));
    }
}
