//! Mock InventoryClient for unit testing
//!
//! This module provides a mock implementation of InventoryClientTrait that can be used
//! in unit tests without requiring a running inventory API.
//!
//! Mutating calls are recorded in order so tests can assert exactly what the
//! controller asked the system to do, and any operation can be made to fail.

mod pools;

use crate::error::InventoryError;
use crate::inventory_trait::InventoryClientTrait;
use crate::models::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A mutating call received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    CreateNetwork(NetworkOpts),
    UpdateNetwork(String, NetworkOpts),
    CreateAddressPool(AddressPoolOpts),
    UpdateAddressPool(String, AddressPoolOpts),
    CreateNetworkAddressPool { network_uuid: String, address_pool_uuid: String },
    DeleteNetworkAddressPool(String),
}

/// Mock InventoryClient for testing
///
/// This mock stores records in memory and can be configured to fail
/// specific operations for testing error paths.
#[derive(Clone)]
pub struct MockInventoryClient {
    pub(crate) base_url: String,
    // In-memory storage, keyed by uuid
    pub(crate) networks: Arc<Mutex<HashMap<String, Network>>>,
    pub(crate) address_pools: Arc<Mutex<HashMap<String, AddressPool>>>,
    pub(crate) associations: Arc<Mutex<HashMap<String, NetworkAddressPool>>>,
    pub(crate) system: Arc<Mutex<Option<System>>>,
    pub(crate) calls: Arc<Mutex<Vec<MockCall>>>,
    pub(crate) failures: Arc<Mutex<HashSet<String>>>,
    // Counter for generating uuids
    pub(crate) next_id: Arc<Mutex<u64>>,
}

impl MockInventoryClient {
    /// Create a new mock client with a standard duplex system record
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            networks: Arc::new(Mutex::new(HashMap::new())),
            address_pools: Arc::new(Mutex::new(HashMap::new())),
            associations: Arc::new(Mutex::new(HashMap::new())),
            system: Arc::new(Mutex::new(Some(System {
                uuid: "system-0".to_string(),
                name: "mock".to_string(),
                system_type: SYSTEM_TYPE_STANDARD.to_string(),
                system_mode: SYSTEM_MODE_DUPLEX.to_string(),
            }))),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashSet::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    /// Add a network to the mock store (for test setup)
    pub fn add_network(&self, network: Network) {
        self.networks.lock().unwrap().insert(network.uuid.clone(), network);
    }

    /// Add an address pool to the mock store (for test setup)
    pub fn add_address_pool(&self, pool: AddressPool) {
        self.address_pools.lock().unwrap().insert(pool.uuid.clone(), pool);
    }

    /// Add an association to the mock store (for test setup)
    pub fn add_network_address_pool(&self, association: NetworkAddressPool) {
        self.associations.lock().unwrap().insert(association.uuid.clone(), association);
    }

    /// Replace the system record; `None` makes `get_system` report not found
    pub fn set_system(&self, system: Option<System>) {
        *self.system.lock().unwrap() = system;
    }

    /// Make every subsequent call of `operation` (trait method name) fail
    pub fn fail_on(&self, operation: &str) {
        self.failures.lock().unwrap().insert(operation.to_string());
    }

    /// Stop failing `operation`
    pub fn clear_failure(&self, operation: &str) {
        self.failures.lock().unwrap().remove(operation);
    }

    /// Mutating calls received so far, oldest first
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Forget recorded calls, keeping stored records
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Current network record by name
    pub fn network_by_name(&self, name: &str) -> Option<Network> {
        self.networks.lock().unwrap().values().find(|n| n.name == name).cloned()
    }

    /// Current address pool record by name
    pub fn address_pool_by_name(&self, name: &str) -> Option<AddressPool> {
        self.address_pools.lock().unwrap().values().find(|p| p.name == name).cloned()
    }

    /// All current associations
    pub fn network_address_pools(&self) -> Vec<NetworkAddressPool> {
        self.associations.lock().unwrap().values().cloned().collect()
    }

    /// Generate next uuid
    pub(crate) fn next_uuid(&self) -> String {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        format!("00000000-0000-4000-8000-{:012}", current)
    }

    pub(crate) fn check_failure(&self, operation: &str) -> Result<(), InventoryError> {
        if self.failures.lock().unwrap().contains(operation) {
            return Err(InventoryError::Api(format!("injected failure in {}", operation)));
        }
        Ok(())
    }

    pub(crate) fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl InventoryClientTrait for MockInventoryClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), InventoryError> {
        self.check_failure("validate_token")
    }

    async fn get_system(&self) -> Result<System, InventoryError> {
        self.check_failure("get_system")?;
        self.system
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| InventoryError::NotFound("no system record reported".to_string()))
    }

    async fn list_networks(&self) -> Result<Vec<Network>, InventoryError> {
        self.check_failure("list_networks")?;
        let mut networks: Vec<Network> = self.networks.lock().unwrap().values().cloned().collect();
        networks.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        Ok(networks)
    }

    async fn create_network(&self, opts: &NetworkOpts) -> Result<Network, InventoryError> {
        self.check_failure("create_network")?;
        self.record(MockCall::CreateNetwork(opts.clone()));

        let name = opts
            .name
            .clone()
            .ok_or_else(|| InventoryError::InvalidRequest("network name is required".to_string()))?;
        if self.network_by_name(&name).is_some() {
            return Err(InventoryError::Conflict(format!("network {} already exists", name)));
        }

        let network = Network {
            uuid: self.next_uuid(),
            name,
            network_type: opts.network_type.clone().unwrap_or_default(),
            dynamic: opts.dynamic.unwrap_or(false),
            pool_uuid: None,
            primary_pool_family: None,
            created_at: Some(chrono::Utc::now()),
            updated_at: None,
        };
        self.add_network(network.clone());
        Ok(network)
    }

    async fn update_network(&self, uuid: &str, opts: &NetworkOpts) -> Result<Network, InventoryError> {
        self.check_failure("update_network")?;
        self.record(MockCall::UpdateNetwork(uuid.to_string(), opts.clone()));

        let mut networks = self.networks.lock().unwrap();
        let network = networks
            .get_mut(uuid)
            .ok_or_else(|| InventoryError::NotFound(format!("Network {} not found", uuid)))?;
        if let Some(name) = &opts.name {
            network.name = name.clone();
        }
        if let Some(network_type) = &opts.network_type {
            network.network_type = network_type.clone();
        }
        if let Some(dynamic) = opts.dynamic {
            network.dynamic = dynamic;
        }
        network.updated_at = Some(chrono::Utc::now());
        Ok(network.clone())
    }

    // Address pool and association operations - delegated to pools module
    async fn list_address_pools(&self) -> Result<Vec<AddressPool>, InventoryError> {
        pools::list_address_pools(self).await
    }

    async fn create_address_pool(&self, opts: &AddressPoolOpts) -> Result<AddressPool, InventoryError> {
        pools::create_address_pool(self, opts).await
    }

    async fn update_address_pool(&self, uuid: &str, opts: &AddressPoolOpts) -> Result<AddressPool, InventoryError> {
        pools::update_address_pool(self, uuid, opts).await
    }

    async fn list_network_address_pools(&self) -> Result<Vec<NetworkAddressPool>, InventoryError> {
        pools::list_network_address_pools(self).await
    }

    async fn create_network_address_pool(&self, network_uuid: &str, address_pool_uuid: &str) -> Result<NetworkAddressPool, InventoryError> {
        pools::create_network_address_pool(self, network_uuid, address_pool_uuid).await
    }

    async fn delete_network_address_pool(&self, uuid: &str) -> Result<(), InventoryError> {
        pools::delete_network_address_pool(self, uuid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_update_network() {
        let client = MockInventoryClient::new("http://mock");
        let created = client
            .create_network(&NetworkOpts {
                name: Some("mgmt".to_string()),
                network_type: Some("mgmt".to_string()),
                dynamic: Some(true),
            })
            .await
            .unwrap();

        let updated = client
            .update_network(&created.uuid, &NetworkOpts { dynamic: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(!updated.dynamic);
        assert_eq!(updated.network_type, "mgmt");
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let client = MockInventoryClient::new("http://mock");
        client.fail_on("list_networks");
        assert!(matches!(client.list_networks().await, Err(InventoryError::Api(_))));
        client.clear_failure("list_networks");
        assert!(client.list_networks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_optional_address() {
        let client = MockInventoryClient::new("http://mock");
        let pool = client
            .create_address_pool(&AddressPoolOpts {
                name: Some("oam".to_string()),
                network: Some("10.10.10.0".to_string()),
                prefix: Some(24),
                gateway_address: FieldUpdate::Set("10.10.10.1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pool.gateway_address.as_deref(), Some("10.10.10.1"));

        let pool = client
            .update_address_pool(&pool.uuid, &AddressPoolOpts { gateway_address: FieldUpdate::Clear, ..Default::default() })
            .await
            .unwrap();
        assert!(pool.gateway_address.is_none());
    }

    #[tokio::test]
    async fn test_second_association_of_same_family_conflicts() {
        let client = MockInventoryClient::new("http://mock");
        let network = client
            .create_network(&NetworkOpts { name: Some("mgmt".to_string()), ..Default::default() })
            .await
            .unwrap();
        let mut pool_uuids = Vec::new();
        for (name, subnet) in [("a", "192.168.204.0"), ("b", "192.168.206.0")] {
            let pool = client
                .create_address_pool(&AddressPoolOpts {
                    name: Some(name.to_string()),
                    network: Some(subnet.to_string()),
                    prefix: Some(24),
                    ..Default::default()
                })
                .await
                .unwrap();
            pool_uuids.push(pool.uuid);
        }

        client.create_network_address_pool(&network.uuid, &pool_uuids[0]).await.unwrap();
        let second = client.create_network_address_pool(&network.uuid, &pool_uuids[1]).await;
        assert!(matches!(second, Err(InventoryError::Conflict(_))));
    }
}
