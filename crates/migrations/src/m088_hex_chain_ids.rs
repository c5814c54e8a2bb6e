// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 88: decimal chain-id keys become hex.
//!
//! Rewrites NFT, token list and token collections keyed by chain id. Keys
//! named `undefined` are deleted. When a decimal key and its hex form both
//! exist the hex-keyed entry wins, except in `tokensChainsCache` where the
//! entry with the newer `timestamp` wins. Cache timestamps in the future are
//! clamped to the current time so the cache still expires.

use crate::chain_id::decimal_to_hex;
use async_trait::async_trait;
use serde_json::{Map, Value};
use statemig_core::guard::{expect_object_mut, is_object, optional_object_mut, type_name, FieldPath};
use statemig_core::{
    isolated, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};

pub struct HexChainIds;

#[async_trait]
impl Migration for HexChainIds {
    fn version(&self) -> Version {
        Version::new(88)
    }

    fn description(&self) -> &'static str {
        "convert decimal chain id keys to hex"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let version = self.version();
        let mut next = previous.stamped(version);

        if next.data.contains_key("NftController") {
            isolated(cx, version, &mut next.data, |data| nft_controller(data, cx, version));
        }

        match next.data.get_mut("TokenListController") {
            Some(Value::Object(controller)) => {
                isolated(cx, version, controller, |controller| {
                    let path =
                        FieldPath::controller("TokenListController").key("tokensChainsCache");
                    let cache = optional_object_mut(controller.get_mut("tokensChainsCache"), &path)?;
                    if let Some(cache) = cache {
                        let now = cx.now_ms();
                        *cache = rekey(std::mem::take(cache), KeepOnCollision::NewestTimestamp);
                        clamp_timestamps(cache, now);
                    }
                    Ok(())
                });
            }
            other => {
                let actual = type_name(other.as_deref());
                tracing::warn!("typeof state.TokenListController is {actual}");
            }
        }

        if next.data.contains_key("TokensController") {
            isolated(cx, version, &mut next.data, |data| tokens_controller(data, cx, version));
        }

        Ok(next)
    }
}

fn nft_controller(
    data: &mut Map<String, Value>,
    cx: &MigrationContext,
    version: Version,
) -> Result<(), ShapeError> {
    let path = FieldPath::controller("NftController");
    let controller = expect_object_mut(data.get_mut("NftController"), &path)?;
    for key in ["allNftContracts", "allNfts"] {
        isolated(cx, version, controller, |controller| {
            let Some(by_account) = optional_object_mut(controller.get_mut(key), &path.key(key))? else {
                return Ok(());
            };
            // Leave the whole collection alone unless every account maps chains.
            if !by_account.values().all(is_object) {
                return Ok(());
            }
            for chains in by_account.values_mut() {
                if let Value::Object(chains) = chains {
                    *chains = rekey(std::mem::take(chains), KeepOnCollision::Hex);
                }
            }
            Ok(())
        });
    }
    Ok(())
}

fn tokens_controller(
    data: &mut Map<String, Value>,
    cx: &MigrationContext,
    version: Version,
) -> Result<(), ShapeError> {
    let path = FieldPath::controller("TokensController");
    let controller = expect_object_mut(data.get_mut("TokensController"), &path)?;
    for key in ["allTokens", "allIgnoredTokens", "allDetectedTokens"] {
        isolated(cx, version, controller, |controller| {
            if let Some(by_chain) = optional_object_mut(controller.get_mut(key), &path.key(key))? {
                *by_chain = rekey(std::mem::take(by_chain), KeepOnCollision::Hex);
            }
            Ok(())
        });
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum KeepOnCollision {
    Hex,
    NewestTimestamp,
}

fn rekey(map: Map<String, Value>, policy: KeepOnCollision) -> Map<String, Value> {
    let mut out = Map::new();
    let mut converted = Vec::new();
    for (key, value) in map {
        if key == "undefined" {
            continue;
        }
        match decimal_to_hex(&key) {
            Some(hex) => converted.push((hex, value)),
            None => {
                out.insert(key, value);
            }
        }
    }
    for (hex, value) in converted {
        let replace = match (out.get(&hex), policy) {
            (None, _) => true,
            (Some(_), KeepOnCollision::Hex) => false,
            (Some(existing), KeepOnCollision::NewestTimestamp) => {
                timestamp(&value) > timestamp(existing)
            }
        };
        if replace {
            out.insert(hex, value);
        }
    }
    out
}

fn timestamp(entry: &Value) -> u64 {
    entry.get("timestamp").and_then(Value::as_u64).unwrap_or(0)
}

fn clamp_timestamps(cache: &mut Map<String, Value>, now: u64) {
    for entry in cache.values_mut() {
        if timestamp(entry) > now {
            entry["timestamp"] = Value::from(now);
        }
    }
}

#[cfg(test)]
#[path = "m088_hex_chain_ids_tests.rs"]
mod tests;
