// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! statemig-migrations: the concrete schema migrations, in release order.
//!
//! Each module holds one unit named after the version it produces. Units
//! never fail on malformed state; they report through the context's
//! [`ErrorReporter`](statemig_core::ErrorReporter) and leave the affected
//! subtree as it was.

mod chain_id;
#[cfg(test)]
mod test_support;

pub mod m054_token_decimals;
pub mod m064_simple_send_type;
pub mod m082_network_configurations;
pub mod m088_hex_chain_ids;
pub mod m094_networks_metadata;
pub mod m120_2_obsolete_state;
pub mod m128_caip25_permission;
pub mod m157_rpc_failover;
pub mod m164_stale_chain_scopes;
pub mod m171_enabled_network_map;
pub mod m174_bridge_tx_keys;
pub mod m186_megaeth_testnet;

pub use m054_token_decimals::TokenDecimals;
pub use m064_simple_send_type::SimpleSendType;
pub use m082_network_configurations::NetworkConfigurations;
pub use m088_hex_chain_ids::HexChainIds;
pub use m094_networks_metadata::NetworksMetadata;
pub use m120_2_obsolete_state::ObsoleteState;
pub use m128_caip25_permission::Caip25Permission;
pub use m157_rpc_failover::RpcFailover;
pub use m164_stale_chain_scopes::StaleChainScopes;
pub use m171_enabled_network_map::EnabledNetworkMap;
pub use m174_bridge_tx_keys::BridgeTxKeys;
pub use m186_megaeth_testnet::MegaEthTestnet;

use statemig_core::{Migration, MigrationRegistry, RegistryError};

/// Every unit, oldest first.
pub fn all() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(TokenDecimals),
        Box::new(SimpleSendType),
        Box::new(NetworkConfigurations),
        Box::new(HexChainIds),
        Box::new(NetworksMetadata),
        Box::new(ObsoleteState),
        Box::new(Caip25Permission),
        Box::new(RpcFailover),
        Box::new(StaleChainScopes),
        Box::new(EnabledNetworkMap),
        Box::new(BridgeTxKeys),
        Box::new(MegaEthTestnet),
    ]
}

/// The production registry.
///
/// Only fails if [`all`] lists a unit out of order.
pub fn registry() -> Result<MigrationRegistry, RegistryError> {
    MigrationRegistry::from_migrations(all())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
