// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 174: key Solana bridge history by source transaction hash.
//!
//! Solana bridge transactions have no transaction-metadata id of their own,
//! so `BridgeStatusController.txHistory` entries whose quote starts on Solana
//! are rekeyed by `status.srcChain.txHash` and their `txMetaId` is set to the
//! same hash. Other entries are untouched. If a Solana entry has no usable
//! hash, or its hash is already taken by another entry, the whole history
//! is left as it was.

use async_trait::async_trait;
use serde_json::{Map, Value};
use statemig_core::guard::{expect_str, is_object, FieldPath};
use statemig_core::{
    atomic, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};

pub struct BridgeTxKeys;

/// Bridge API chain id for Solana mainnet.
pub const SOLANA_CHAIN_ID: u64 = 1_151_111_081_099_710;

#[async_trait]
impl Migration for BridgeTxKeys {
    fn version(&self) -> Version {
        Version::new(174)
    }

    fn description(&self) -> &'static str {
        "key solana bridge history by source tx hash"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let mut next = previous.stamped(self.version());
        let has_history = next
            .data
            .get("BridgeStatusController")
            .and_then(|controller| controller.get("txHistory"))
            .is_some_and(is_object);
        if !has_history {
            tracing::debug!("no bridge txHistory, skipping");
            return Ok(next);
        }
        atomic(cx, self.version(), &mut next.data, rekey_history);
        Ok(next)
    }
}

fn is_solana(item: &Value) -> bool {
    item.get("quote")
        .and_then(|quote| quote.get("srcChainId"))
        .and_then(Value::as_u64)
        == Some(SOLANA_CHAIN_ID)
}

fn rekey_history(data: &mut Map<String, Value>) -> Result<(), ShapeError> {
    let path = FieldPath::controller("BridgeStatusController").key("txHistory");
    let Some(Value::Object(history)) = data
        .get_mut("BridgeStatusController")
        .and_then(|controller| controller.get_mut("txHistory"))
    else {
        return Ok(());
    };

    let (solana, others): (Vec<_>, Vec<_>) =
        std::mem::take(history).into_iter().partition(|(_, item)| is_solana(item));
    let mut rekeyed: Map<String, Value> = others.into_iter().collect();

    for (id, mut item) in solana {
        let hash = source_hash(&item, &path.key(&id)).map_err(rekey_failed)?;
        if rekeyed.contains_key(&hash) {
            return Err(rekey_failed(ShapeError::invalid_entry(
                path.key(&id),
                format!("txHash {hash} is already a txHistory key"),
            )));
        }
        if let Value::Object(entry) = &mut item {
            entry.insert("txMetaId".into(), Value::String(hash.clone()));
        }
        rekeyed.insert(hash, item);
    }
    *history = rekeyed;
    Ok(())
}

fn source_hash(item: &Value, item_path: &FieldPath) -> Result<String, ShapeError> {
    let hash = item
        .get("status")
        .and_then(|status| status.get("srcChain"))
        .and_then(|src| src.get("txHash"));
    let hash_path = item_path.key("status").key("srcChain").key("txHash");
    expect_str(hash, &hash_path).map(str::to_string)
}

fn rekey_failed(error: ShapeError) -> ShapeError {
    ShapeError::invalid(format!(
        "Failed to update bridge txHistory for solana to use txHash as key and txMetaId: {error}"
    ))
}

#[cfg(test)]
#[path = "m174_bridge_tx_keys_tests.rs"]
mod tests;
