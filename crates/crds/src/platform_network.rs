//! PlatformNetwork Custom Resource Definition
//!
//! Declares a platform network (oam, mgmt, cluster-host, ...) and the
//! address pools that should be associated with it on the system.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PlatformNetworkSpec defines the desired state of a platform network
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "starlingx.windriver.com",
    version = "v1",
    kind = "PlatformNetwork",
    namespaced,
    status = "PlatformNetworkStatus",
    shortname = "pn",
    printcolumn = r#"{"name":"type", "type":"string", "jsonPath":".spec.type"}"#,
    printcolumn = r#"{"name":"scope", "type":"string", "jsonPath":".status.deploymentScope"}"#,
    printcolumn = r#"{"name":"insync", "type":"boolean", "jsonPath":".status.inSync"}"#,
    printcolumn = r#"{"name":"reconciled", "type":"boolean", "jsonPath":".status.reconciled"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PlatformNetworkSpec {
    /// Network type
    #[serde(rename = "type")]
    pub network_type: NetworkType,

    /// Whether addresses are allocated dynamically
    #[serde(default)]
    pub dynamic: bool,

    /// Names of the AddressPool resources (same namespace) to associate with
    /// this network. At most one per IP family ends up associated.
    #[serde(default)]
    pub associated_address_pools: Vec<String>,
}

/// Platform network type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkType {
    Oam,
    Mgmt,
    ClusterHost,
    Pxeboot,
    Admin,
    Other,
}

impl NetworkType {
    /// Name used by the system inventory API
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Oam => "oam",
            NetworkType::Mgmt => "mgmt",
            NetworkType::ClusterHost => "cluster-host",
            NetworkType::Pxeboot => "pxeboot",
            NetworkType::Admin => "admin",
            NetworkType::Other => "other",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment phase the network belongs to
///
/// Serializes lowercase. `principal` is accepted as an alias of `day2` for
/// resources written by older deployment tooling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentScope {
    /// Initial, one-time system configuration
    #[default]
    Bootstrap,
    /// Steady-state configuration after bootstrap
    #[serde(alias = "principal")]
    Day2,
}

/// PlatformNetworkStatus defines the observed state of a platform network.
///
/// Only the controller writes these fields, except `deploymentScope` which is
/// owned by the deployment tooling.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformNetworkStatus {
    /// UUID of the network as reported by the system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Deployment phase
    #[serde(default)]
    pub deployment_scope: DeploymentScope,

    /// Whether the system configuration matches the spec
    #[serde(default)]
    pub in_sync: bool,

    /// Whether the controller considers the network settled
    #[serde(default)]
    pub reconciled: bool,

    /// Last computed difference between spec and system, one field per line.
    /// Always serialized so an empty delta clears a stale one.
    #[serde(default)]
    pub delta: String,
}

impl PlatformNetwork {
    /// Status, or the default status for a resource that has never been reconciled
    pub fn status_or_default(&self) -> PlatformNetworkStatus {
        self.status.clone().unwrap_or_default()
    }

    /// Deployment scope of this network
    pub fn deployment_scope(&self) -> DeploymentScope {
        self.status
            .as_ref()
            .map(|s| s.deployment_scope)
            .unwrap_or_default()
    }

    /// Stored system UUID, if any
    pub fn status_id(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.id.as_deref())
    }

    /// Mutable status, created on first access
    pub fn status_mut(&mut self) -> &mut PlatformNetworkStatus {
        self.status.get_or_insert_with(PlatformNetworkStatus::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_type_round_trips_kebab_case() {
        let t: NetworkType = serde_json::from_str("\"cluster-host\"").unwrap();
        assert_eq!(t, NetworkType::ClusterHost);
        assert_eq!(serde_json::to_string(&NetworkType::Pxeboot).unwrap(), "\"pxeboot\"");
        assert!(serde_json::from_str::<NetworkType>("\"storage\"").is_err());
    }

    #[test]
    fn test_deployment_scope_defaults_to_bootstrap() {
        let status: PlatformNetworkStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(status.deployment_scope, DeploymentScope::Bootstrap);
        assert!(!status.in_sync);
        assert!(status.delta.is_empty());
    }

    #[test]
    fn test_deployment_scope_accepts_principal_alias() {
        let scope: DeploymentScope = serde_json::from_str("\"principal\"").unwrap();
        assert_eq!(scope, DeploymentScope::Day2);
        assert_eq!(serde_json::to_string(&scope).unwrap(), "\"day2\"");
    }

    #[test]
    fn test_spec_parses_from_manifest_fields() {
        let spec: PlatformNetworkSpec = serde_json::from_value(serde_json::json!({
            "type": "mgmt",
            "dynamic": false,
            "associatedAddressPools": ["management-ipv4", "management-ipv6"],
        }))
        .unwrap();
        assert_eq!(spec.network_type, NetworkType::Mgmt);
        assert_eq!(spec.associated_address_pools.len(), 2);
    }

    #[test]
    fn test_empty_delta_is_serialized() {
        let status = PlatformNetworkStatus::default();
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["delta"], "");
        assert!(value.get("id").is_none());
    }
}
