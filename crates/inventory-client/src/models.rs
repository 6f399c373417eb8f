//! System inventory API models
//!
//! These models match the inventory REST API payloads for networks, address
//! pools, network-address-pool associations and the system record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Network record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Network {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub network_type: String,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub pool_uuid: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub primary_pool_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Address pool record
///
/// Optional addresses are reported either as null or as an empty string by
/// different API versions; both deserialize to `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct AddressPool {
    pub uuid: String,
    pub name: String,
    /// Network address of the pool
    pub network: String,
    pub prefix: i32,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order: Option<String>,
    #[serde(default)]
    pub ranges: Vec<AddressRange>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub floating_address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub controller0_address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub controller1_address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub gateway_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Address range, encoded on the wire as a two element array `[start, end]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressRange(pub String, pub String);

impl AddressRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self(start.into(), end.into())
    }

    pub fn start(&self) -> &str {
        &self.0
    }

    pub fn end(&self) -> &str {
        &self.1
    }
}

/// Association between one network and one address pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NetworkAddressPool {
    pub uuid: String,
    pub network_uuid: String,
    pub address_pool_uuid: String,
    #[serde(default)]
    pub network_name: String,
    #[serde(default)]
    pub address_pool_name: String,
}

/// System record, used for topology-dependent validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct System {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    /// "All-in-one" or "Standard"
    pub system_type: String,
    /// "simplex", "duplex" or "duplex-direct"
    pub system_mode: String,
}

pub const SYSTEM_TYPE_ALL_IN_ONE: &str = "All-in-one";
pub const SYSTEM_TYPE_STANDARD: &str = "Standard";
pub const SYSTEM_MODE_SIMPLEX: &str = "simplex";
pub const SYSTEM_MODE_DUPLEX: &str = "duplex";

impl System {
    /// True for a single all-in-one controller running in simplex mode
    pub fn is_single_node_simplex(&self) -> bool {
        self.system_type == SYSTEM_TYPE_ALL_IN_ONE && self.system_mode == SYSTEM_MODE_SIMPLEX
    }
}

/// List envelopes returned by the collection endpoints
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NetworkList {
    pub networks: Vec<Network>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AddressPoolList {
    pub addrpools: Vec<AddressPool>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NetworkAddressPoolList {
    pub network_addrpools: Vec<NetworkAddressPool>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SystemList {
    pub isystems: Vec<System>,
}

/// Intent for an optional field in an update request
///
/// Distinguishes "leave alone" from "explicitly clear", which a plain
/// `Option` cannot express.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    /// Value for a create request, where clearing is meaningless
    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }
}

/// Fields to send when creating or updating a network.
/// `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkOpts {
    pub name: Option<String>,
    pub network_type: Option<String>,
    pub dynamic: Option<bool>,
}

impl NetworkOpts {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.network_type.is_none() && self.dynamic.is_none()
    }

    /// Body for `POST /v1/networks`
    pub fn to_create_body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        if let Some(name) = &self.name {
            body.insert("name".to_string(), name.clone().into());
        }
        if let Some(network_type) = &self.network_type {
            body.insert("type".to_string(), network_type.clone().into());
        }
        if let Some(dynamic) = self.dynamic {
            body.insert("dynamic".to_string(), dynamic.into());
        }
        serde_json::Value::Object(body)
    }

    /// JSON-patch body for `PATCH /v1/networks/{uuid}`
    pub fn to_patch(&self) -> Vec<PatchOperation> {
        let mut ops = Vec::new();
        if let Some(name) = &self.name {
            ops.push(PatchOperation::replace("/name", name.clone()));
        }
        if let Some(network_type) = &self.network_type {
            ops.push(PatchOperation::replace("/type", network_type.clone()));
        }
        if let Some(dynamic) = self.dynamic {
            ops.push(PatchOperation::replace("/dynamic", dynamic));
        }
        ops
    }
}

/// Fields to send when creating or updating an address pool
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddressPoolOpts {
    pub name: Option<String>,
    pub network: Option<String>,
    pub prefix: Option<i32>,
    pub floating_address: FieldUpdate<String>,
    pub controller0_address: FieldUpdate<String>,
    pub controller1_address: FieldUpdate<String>,
    pub gateway_address: FieldUpdate<String>,
    pub order: Option<String>,
    pub ranges: Option<Vec<AddressRange>>,
}

impl AddressPoolOpts {
    fn addresses(&self) -> [(&'static str, &FieldUpdate<String>); 4] {
        [
            ("floating_address", &self.floating_address),
            ("controller0_address", &self.controller0_address),
            ("controller1_address", &self.controller1_address),
            ("gateway_address", &self.gateway_address),
        ]
    }

    /// Body for `POST /v1/addrpools`
    pub fn to_create_body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        if let Some(name) = &self.name {
            body.insert("name".to_string(), name.clone().into());
        }
        if let Some(network) = &self.network {
            body.insert("network".to_string(), network.clone().into());
        }
        if let Some(prefix) = self.prefix {
            body.insert("prefix".to_string(), prefix.into());
        }
        for (field, update) in self.addresses() {
            if let Some(value) = update.as_set() {
                body.insert(field.to_string(), value.clone().into());
            }
        }
        if let Some(order) = &self.order {
            body.insert("order".to_string(), order.clone().into());
        }
        if let Some(ranges) = &self.ranges {
            body.insert("ranges".to_string(), ranges_to_value(ranges));
        }
        serde_json::Value::Object(body)
    }

    /// JSON-patch body for `PATCH /v1/addrpools/{uuid}`
    pub fn to_patch(&self) -> Vec<PatchOperation> {
        let mut ops = Vec::new();
        if let Some(name) = &self.name {
            ops.push(PatchOperation::replace("/name", name.clone()));
        }
        if let Some(network) = &self.network {
            ops.push(PatchOperation::replace("/network", network.clone()));
        }
        if let Some(prefix) = self.prefix {
            ops.push(PatchOperation::replace("/prefix", prefix));
        }
        for (field, update) in self.addresses() {
            let path = format!("/{}", field);
            match update {
                FieldUpdate::Unchanged => {}
                FieldUpdate::Set(value) => ops.push(PatchOperation::replace(&path, value.clone())),
                FieldUpdate::Clear => ops.push(PatchOperation::remove(&path)),
            }
        }
        if let Some(order) = &self.order {
            ops.push(PatchOperation::replace("/order", order.clone()));
        }
        if let Some(ranges) = &self.ranges {
            ops.push(PatchOperation::replace("/ranges", ranges_to_value(ranges)));
        }
        ops
    }
}

fn ranges_to_value(ranges: &[AddressRange]) -> serde_json::Value {
    serde_json::Value::Array(
        ranges
            .iter()
            .map(|r| serde_json::json!([r.start(), r.end()]))
            .collect(),
    )
}

/// Single JSON-patch operation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatchOperation {
    pub op: &'static str,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl PatchOperation {
    pub fn replace(path: &str, value: impl Into<serde_json::Value>) -> Self {
        Self { op: "replace", path: path.to_string(), value: Some(value.into()) }
    }

    pub fn remove(path: &str) -> Self {
        Self { op: "remove", path: path.to_string(), value: None }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
