// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 157: give Infura RPC endpoints a failover URL.
//!
//! An endpoint qualifies when it points at one of our Infura subdomains with
//! our project id (or the `{infuraProjectId}` placeholder for built-in
//! endpoints) and has no failover URLs yet. The URL comes from
//! [`MigratorConfig`](statemig_core::MigratorConfig); subdomains without one
//! are left alone.

use async_trait::async_trait;
use serde_json::{Map, Value};
use statemig_core::guard::{type_name, FieldPath};
use statemig_core::{
    atomic, Migration, MigrationContext, MigrationError, MigratorConfig, ShapeError, Version,
    VersionedDocument,
};

pub struct RpcFailover;

const PROJECT_ID_PLACEHOLDER: &str = "{infuraProjectId}";

#[async_trait]
impl Migration for RpcFailover {
    fn version(&self) -> Version {
        Version::new(157)
    }

    fn description(&self) -> &'static str {
        "assign failover URLs to Infura RPC endpoints"
    }

    async fn migrate(
        &self,
        previous: &VersionedDocument,
        cx: &MigrationContext,
    ) -> Result<VersionedDocument, MigrationError> {
        let mut next = previous.stamped(self.version());
        let config = cx.config();
        let Some(project_id) = config.infura_project_id.as_deref() else {
            cx.report(self.version(), ShapeError::invalid("No INFURA_PROJECT_ID set!"));
            return Ok(next);
        };
        atomic(cx, self.version(), &mut next.data, |data| {
            assign_failovers(data, project_id, config)
        });
        Ok(next)
    }
}

fn not_an_object(path: &FieldPath, value: &Value) -> ShapeError {
    ShapeError::invalid(format!(
        "Expected {path} to be an object, but is {}",
        type_name(Some(value))
    ))
}

fn assign_failovers(
    data: &mut Map<String, Value>,
    project_id: &str,
    config: &MigratorConfig,
) -> Result<(), ShapeError> {
    let path = FieldPath::controller("NetworkController");
    let network = match data.get_mut("NetworkController") {
        None => return Err(ShapeError::Missing { path: path.to_string() }),
        Some(Value::Object(network)) => network,
        Some(other) => return Err(not_an_object(&path, other)),
    };
    let by_chain_path = path.key("networkConfigurationsByChainId");
    let by_chain = match network.get_mut("networkConfigurationsByChainId") {
        None => {
            return Err(ShapeError::Missing {
                path: by_chain_path.to_string(),
            })
        }
        Some(Value::Object(by_chain)) => by_chain,
        Some(other) => return Err(not_an_object(&by_chain_path, other)),
    };

    for configuration in by_chain.values_mut() {
        let Some(Value::Array(endpoints)) = configuration.get_mut("rpcEndpoints") else {
            continue;
        };
        for endpoint in endpoints.iter_mut() {
            let Value::Object(endpoint) = endpoint else {
                continue;
            };
            let has_failovers = matches!(
                endpoint.get("failoverUrls"),
                Some(Value::Array(urls)) if !urls.is_empty()
            );
            if has_failovers {
                continue;
            }
            let Some(subdomain) = infura_subdomain(endpoint, project_id) else {
                continue;
            };
            if let Some(url) = config.failover_url(&subdomain) {
                tracing::debug!(%subdomain, "assigning failover url");
                endpoint.insert("failoverUrls".into(), Value::from(vec![url.to_string()]));
            }
        }
    }
    Ok(())
}

/// Subdomain of an endpoint served by our Infura project.
fn infura_subdomain(endpoint: &Map<String, Value>, project_id: &str) -> Option<String> {
    let url = endpoint.get("url")?.as_str()?;
    let rest = url.strip_prefix("https://")?;
    let (subdomain, key) = rest.split_once(".infura.io/v3/")?;
    let ours = match endpoint.get("type").and_then(Value::as_str) {
        Some("infura") => key == PROJECT_ID_PLACEHOLDER || key == project_id,
        Some("custom") => key == project_id,
        _ => false,
    };
    (ours && !subdomain.is_empty() && !subdomain.contains('/')).then(|| subdomain.to_string())
}

#[cfg(test)]
#[path = "m157_rpc_failover_tests.rs"]
mod tests;
