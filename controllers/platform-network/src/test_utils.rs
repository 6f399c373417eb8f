//! Test utilities for unit testing the reconciler
//!
//! In-memory stand-ins for the control-plane store and the event sink, plus
//! builders for desired and remote resources.

use crate::error::ControllerError;
use crate::events::{EventReason, EventSink};
use crate::reconciler::Reconciler;
use crate::store::ResourceStore;
use crds::*;
use inventory_client::{
    AddressPool as RemoteAddressPool, AddressRange, MockInventoryClient, Network as RemoteNetwork,
    NetworkAddressPool, System, SYSTEM_MODE_DUPLEX, SYSTEM_MODE_SIMPLEX, SYSTEM_TYPE_ALL_IN_ONE,
    SYSTEM_TYPE_STANDARD,
};
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const TEST_NAMESPACE: &str = "default";

/// In-memory ResourceStore keyed by `namespace/name`
#[derive(Clone, Default)]
pub struct InMemoryStore {
    networks: Arc<Mutex<BTreeMap<String, PlatformNetwork>>>,
    pools: Arc<Mutex<BTreeMap<String, AddressPool>>>,
    fail_status_writes: Arc<Mutex<bool>>,
    fail_pool_status_writes: Arc<Mutex<bool>>,
}

fn key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_network(&self, network: PlatformNetwork) {
        let k = key(&network.namespace().unwrap_or_default(), &network.name_any());
        self.networks.lock().unwrap().insert(k, network);
    }

    pub fn add_pool(&self, pool: AddressPool) {
        let k = key(&pool.namespace().unwrap_or_default(), &pool.name_any());
        self.pools.lock().unwrap().insert(k, pool);
    }

    pub fn network(&self, name: &str) -> PlatformNetwork {
        self.networks.lock().unwrap()[&key(TEST_NAMESPACE, name)].clone()
    }

    pub fn pool(&self, name: &str) -> AddressPool {
        self.pools.lock().unwrap()[&key(TEST_NAMESPACE, name)].clone()
    }

    /// Make every status write fail
    pub fn fail_status_writes(&self, fail: bool) {
        *self.fail_status_writes.lock().unwrap() = fail;
    }

    /// Make only AddressPool status writes fail
    pub fn fail_pool_status_writes(&self, fail: bool) {
        *self.fail_pool_status_writes.lock().unwrap() = fail;
    }

    fn check_status_write(&self, kind: &'static str, name: &str) -> Result<(), ControllerError> {
        let pool_write = kind == "addresspool";
        if *self.fail_status_writes.lock().unwrap() || (pool_write && *self.fail_pool_status_writes.lock().unwrap()) {
            return Err(ControllerError::StatusUpdate {
                kind,
                name: name.to_string(),
                source: "status write rejected".into(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResourceStore for InMemoryStore {
    async fn list_platform_networks(&self, namespace: &str) -> Result<Vec<PlatformNetwork>, ControllerError> {
        let prefix = format!("{}/", namespace);
        Ok(self
            .networks
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(_, n)| n.clone())
            .collect())
    }

    async fn get_platform_network(&self, namespace: &str, name: &str) -> Result<Option<PlatformNetwork>, ControllerError> {
        Ok(self.networks.lock().unwrap().get(&key(namespace, name)).cloned())
    }

    async fn get_address_pool(&self, namespace: &str, name: &str) -> Result<Option<AddressPool>, ControllerError> {
        Ok(self.pools.lock().unwrap().get(&key(namespace, name)).cloned())
    }

    async fn update_network_status(&self, network: &PlatformNetwork) -> Result<(), ControllerError> {
        self.check_status_write("platform network", &network.name_any())?;
        let k = key(&network.namespace().unwrap_or_default(), &network.name_any());
        if let Some(stored) = self.networks.lock().unwrap().get_mut(&k) {
            stored.status = network.status.clone();
        }
        Ok(())
    }

    async fn update_address_pool_status(&self, pool: &AddressPool) -> Result<(), ControllerError> {
        self.check_status_write("addresspool", &pool.name_any())?;
        let k = key(&pool.namespace().unwrap_or_default(), &pool.name_any());
        if let Some(stored) = self.pools.lock().unwrap().get_mut(&k) {
            stored.status = pool.status.clone();
        }
        Ok(())
    }
}

/// A notification captured by RecordingEventSink
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub object: String,
    pub reason: EventReason,
    pub message: String,
}

/// EventSink that keeps every notification
#[derive(Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl EventSink for RecordingEventSink {
    async fn notify(&self, object: &ObjectReference, reason: EventReason, message: String) {
        self.events.lock().unwrap().push(RecordedEvent {
            object: object.name.clone().unwrap_or_default(),
            reason,
            message,
        });
    }
}

/// Handles kept by a test after the reconciler takes ownership of its parts
pub struct TestHarness {
    pub reconciler: Reconciler,
    pub inventory: MockInventoryClient,
    pub store: InMemoryStore,
    pub events: RecordingEventSink,
}

pub fn create_test_harness() -> TestHarness {
    let inventory = MockInventoryClient::new("http://test-inventory");
    let store = InMemoryStore::new();
    let events = RecordingEventSink::new();
    let reconciler = Reconciler::new(
        Box::new(inventory.clone()),
        Box::new(store.clone()),
        Box::new(events.clone()),
        true,
    );
    TestHarness { reconciler, inventory, store, events }
}

/// Helper to create a test PlatformNetwork
pub fn test_network(name: &str, network_type: NetworkType, scope: DeploymentScope, pools: &[&str]) -> PlatformNetwork {
    let mut network = PlatformNetwork::new(
        name,
        PlatformNetworkSpec {
            network_type,
            dynamic: false,
            associated_address_pools: pools.iter().map(|p| p.to_string()).collect(),
        },
    );
    network.metadata = ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(TEST_NAMESPACE.to_string()),
        ..Default::default()
    };
    network.status = Some(PlatformNetworkStatus { deployment_scope: scope, ..Default::default() });
    network
}

/// Helper to create a test AddressPool with no optional fields
pub fn test_address_pool(name: &str, subnet: &str, prefix: i32) -> AddressPool {
    let mut pool = AddressPool::new(
        name,
        AddressPoolSpec {
            subnet: subnet.to_string(),
            prefix,
            ..Default::default()
        },
    );
    pool.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    pool
}

/// Helper to create a fully populated IPv4 pool for `subnet` ("a.b.c.0")
pub fn full_address_pool(name: &str, subnet: &str) -> AddressPool {
    let base = subnet.trim_end_matches(".0");
    let mut pool = test_address_pool(name, subnet, 24);
    pool.spec.floating_address = Some(format!("{}.2", base));
    pool.spec.controller0_address = Some(format!("{}.3", base));
    pool.spec.controller1_address = Some(format!("{}.4", base));
    pool.spec.gateway = Some(format!("{}.1", base));
    pool.spec.allocation = AllocationInfo {
        order: Some("random".to_string()),
        ranges: vec![AllocationRange { start: format!("{}.2", base), end: format!("{}.254", base) }],
    };
    pool
}

/// Helper to create a remote network record
pub fn remote_network(uuid: &str, name: &str, network_type: &str) -> RemoteNetwork {
    RemoteNetwork {
        uuid: uuid.to_string(),
        name: name.to_string(),
        network_type: network_type.to_string(),
        dynamic: false,
        pool_uuid: None,
        primary_pool_family: None,
        created_at: None,
        updated_at: None,
    }
}

/// Helper to create a remote pool record mirroring a desired pool
pub fn remote_pool_from(uuid: &str, pool: &AddressPool) -> RemoteAddressPool {
    let spec = &pool.spec;
    RemoteAddressPool {
        uuid: uuid.to_string(),
        name: pool.name_any(),
        network: spec.subnet.clone(),
        prefix: spec.prefix,
        order: spec.allocation.order.clone(),
        ranges: spec
            .allocation
            .ranges
            .iter()
            .map(|r| AddressRange::new(r.start.clone(), r.end.clone()))
            .collect(),
        floating_address: spec.floating_address.clone(),
        controller0_address: spec.controller0_address.clone(),
        controller1_address: spec.controller1_address.clone(),
        gateway_address: spec.gateway.clone(),
        created_at: None,
        updated_at: None,
    }
}

/// Helper to create a remote association record
pub fn remote_association(uuid: &str, network: &RemoteNetwork, pool: &RemoteAddressPool) -> NetworkAddressPool {
    NetworkAddressPool {
        uuid: uuid.to_string(),
        network_uuid: network.uuid.clone(),
        address_pool_uuid: pool.uuid.clone(),
        network_name: network.name.clone(),
        address_pool_name: pool.name.clone(),
    }
}

pub fn simplex_system() -> System {
    System {
        uuid: "system-0".to_string(),
        name: "lab".to_string(),
        system_type: SYSTEM_TYPE_ALL_IN_ONE.to_string(),
        system_mode: SYSTEM_MODE_SIMPLEX.to_string(),
    }
}

pub fn multinode_system() -> System {
    System {
        uuid: "system-0".to_string(),
        name: "lab".to_string(),
        system_type: SYSTEM_TYPE_STANDARD.to_string(),
        system_mode: SYSTEM_MODE_DUPLEX.to_string(),
    }
}
