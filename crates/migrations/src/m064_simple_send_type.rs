// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 64: transaction type `sentEther` is renamed `simpleSend`.
//!
//! Applies to each transaction and to the full-state snapshots in its
//! `history`. History patch arrays are left alone.

use async_trait::async_trait;
use serde_json::Value;
use statemig_core::guard::{expect_object_mut, is_object, FieldPath};
use statemig_core::{isolated, Migration, MigrationContext, MigrationError, Version, VersionedDocument};

pub struct SimpleSendType;

const SENT_ETHER: &str = "sentEther";
const SIMPLE_SEND: &str = "simpleSend";

#[async_trait]
impl Migration for SimpleSendType {
    fn version(&self) -> Version {
        Version::new(64)
    }

    fn description(&self) -> &'static str {
        "rename sentEther transactions to simpleSend"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let mut next = previous.stamped(self.version());
        if !next.data.contains_key("TransactionController") {
            return Ok(next);
        }
        isolated(cx, self.version(), &mut next.data, |data| {
            let path = FieldPath::controller("TransactionController");
            let controller = expect_object_mut(data.get_mut("TransactionController"), &path)?;
            // Arrays here predate keyed transactions and are left alone.
            if let Some(Value::Object(transactions)) = controller.get_mut("transactions") {
                for tx in transactions.values_mut() {
                    rename(tx);
                    if let Some(Value::Array(history)) = tx.get_mut("history") {
                        history.iter_mut().filter(|entry| is_object(entry)).for_each(rename);
                    }
                }
            }
            Ok(())
        });
        Ok(next)
    }
}

fn rename(entry: &mut Value) {
    if let Some(kind) = entry.get_mut("type") {
        if *kind == SENT_ETHER {
            *kind = Value::from(SIMPLE_SEND);
        }
    }
}

#[cfg(test)]
#[path = "m064_simple_send_type_tests.rs"]
mod tests;
