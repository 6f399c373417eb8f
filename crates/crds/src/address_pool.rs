//! AddressPool Custom Resource Definition
//!
//! Declares an address pool (subnet, well-known addresses, allocation
//! ranges) to be configured on the system. A pool has no deployment scope of
//! its own; it is reconciled in the context of the PlatformNetwork that
//! lists it.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// AddressPoolSpec defines the desired state of an address pool
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[kube(
    group = "starlingx.windriver.com",
    version = "v1",
    kind = "AddressPool",
    namespaced,
    status = "AddressPoolStatus",
    shortname = "addrpool",
    printcolumn = r#"{"name":"subnet", "type":"string", "jsonPath":".spec.subnet"}"#,
    printcolumn = r#"{"name":"prefix", "type":"integer", "jsonPath":".spec.prefix"}"#,
    printcolumn = r#"{"name":"insync", "type":"boolean", "jsonPath":".status.inSync"}"#,
    printcolumn = r#"{"name":"reconciled", "type":"boolean", "jsonPath":".status.reconciled"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AddressPoolSpec {
    /// Network address of the pool (e.g., "192.168.204.0")
    pub subnet: String,

    /// Prefix length of the subnet
    pub prefix: i32,

    /// Floating (virtual) address of the controllers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floating_address: Option<String>,

    /// Address of controller-0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller0_address: Option<String>,

    /// Address of controller-1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller1_address: Option<String>,

    /// Gateway address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,

    /// Allocation order and ranges
    #[serde(default)]
    pub allocation: AllocationInfo,
}

/// How addresses are handed out from the pool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AllocationInfo {
    /// Allocation order ("random" or "sequential")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    /// Address ranges available for allocation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<AllocationRange>,
}

/// Inclusive address range
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRange {
    /// First address of the range
    pub start: String,
    /// Last address of the range
    pub end: String,
}

/// AddressPoolStatus defines the observed state of an address pool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddressPoolStatus {
    /// UUID of the address pool as reported by the system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Whether the system configuration matches the spec
    #[serde(default)]
    pub in_sync: bool,

    /// Whether the controller considers the pool settled
    #[serde(default)]
    pub reconciled: bool,

    /// Last computed difference between spec and system
    #[serde(default)]
    pub delta: String,
}

impl AddressPool {
    /// Stored system UUID, if any
    pub fn status_id(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.id.as_deref())
    }

    /// Mutable status, created on first access
    pub fn status_mut(&mut self) -> &mut AddressPoolStatus {
        self.status.get_or_insert_with(AddressPoolStatus::default)
    }
}
