// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 54: token `decimals` stored as strings become numbers.
//!
//! Tokens whose `decimals` string is not a base-10 integer are dropped, one
//! report per dropped token. `tokens` and every `accountTokens` list are
//! handled independently.

use async_trait::async_trait;
use serde_json::{Map, Value};
use statemig_core::guard::{expect_array_mut, expect_object_mut, FieldPath};
use statemig_core::{
    isolated, Migration, MigrationContext, MigrationError, ShapeError, Version, VersionedDocument,
};

pub struct TokenDecimals;

const VERSION: u32 = 54;

#[async_trait]
impl Migration for TokenDecimals {
    fn version(&self) -> Version {
        Version::new(VERSION)
    }

    fn description(&self) -> &'static str {
        "retype string token decimals as numbers"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let version = self.version();
        let mut next = previous.stamped(version);
        if !next.data.contains_key("PreferencesController") {
            return Ok(next);
        }
        let path = FieldPath::controller("PreferencesController");
        isolated(cx, version, &mut next.data, |data| {
            let prefs = expect_object_mut(data.get_mut("PreferencesController"), &path)?;
            retype_all(prefs, &path, cx, version);
            Ok(())
        });
        Ok(next)
    }
}

fn retype_all(prefs: &mut Map<String, Value>, path: &FieldPath, cx: &MigrationContext, version: Version) {
    let tokens_path = path.key("tokens");
    if let Some(tokens) = prefs.get_mut("tokens") {
        match expect_array_mut(Some(tokens), &tokens_path) {
            Ok(tokens) => retype_list(tokens, &tokens_path, cx, version),
            Err(error) => cx.report(version, error),
        }
    }

    // Very old state stored an empty array here.
    let Some(Value::Object(accounts)) = prefs.get_mut("accountTokens") else {
        return;
    };
    let accounts_path = path.key("accountTokens");
    for (account, chains) in accounts.iter_mut() {
        let Value::Object(chains) = chains else {
            continue;
        };
        for (chain, tokens) in chains.iter_mut() {
            if let Value::Array(tokens) = tokens {
                let list_path = accounts_path.key(account).key(chain);
                retype_list(tokens, &list_path, cx, version);
            }
        }
    }
}

fn retype_list(tokens: &mut Vec<Value>, path: &FieldPath, cx: &MigrationContext, version: Version) {
    let mut kept = Vec::with_capacity(tokens.len());
    for (index, mut token) in std::mem::take(tokens).into_iter().enumerate() {
        let Some(Value::String(raw)) = token.get("decimals") else {
            kept.push(token);
            continue;
        };
        match parse_decimals(raw) {
            Some(decimals) => {
                token["decimals"] = Value::from(decimals);
                kept.push(token);
            }
            None => {
                cx.report(
                    version,
                    ShapeError::invalid_entry(
                        path.index(index),
                        format!("decimals {raw:?} is not a number, token removed"),
                    ),
                );
            }
        }
    }
    *tokens = kept;
}

/// Strict base-10: `"18xx"` and `""` are rejected.
fn parse_decimals(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
#[path = "m054_token_decimals_tests.rs"]
mod tests;
