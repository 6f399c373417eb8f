//! Control-plane resource store.
//!
//! The reconciler reads PlatformNetwork and AddressPool resources and writes
//! their status through this trait so it can be exercised without a cluster.

use crate::error::ControllerError;
use crds::{AddressPool, PlatformNetwork};
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use tracing::debug;

/// Access to the desired-state resources and their status sub-resources
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync {
    /// All PlatformNetworks in `namespace`
    async fn list_platform_networks(&self, namespace: &str) -> Result<Vec<PlatformNetwork>, ControllerError>;

    /// A single PlatformNetwork, `None` if it does not exist
    async fn get_platform_network(&self, namespace: &str, name: &str) -> Result<Option<PlatformNetwork>, ControllerError>;

    /// A single AddressPool, `None` if it does not exist
    async fn get_address_pool(&self, namespace: &str, name: &str) -> Result<Option<AddressPool>, ControllerError>;

    /// Persist the controller-owned status fields of a PlatformNetwork
    async fn update_network_status(&self, network: &PlatformNetwork) -> Result<(), ControllerError>;

    /// Persist the controller-owned status fields of an AddressPool
    async fn update_address_pool_status(&self, pool: &AddressPool) -> Result<(), ControllerError>;
}

/// Kubernetes-backed store
pub struct KubeResourceStore {
    client: Client,
}

impl KubeResourceStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn networks(&self, namespace: &str) -> Api<PlatformNetwork> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn address_pools(&self, namespace: &str) -> Api<AddressPool> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Merge patch for the fields this controller owns. `deploymentScope` belongs
/// to the deployment tooling and is not written.
fn network_status_patch(network: &PlatformNetwork) -> serde_json::Value {
    let status = network.status_or_default();
    serde_json::json!({
        "status": {
            "id": status.id,
            "inSync": status.in_sync,
            "reconciled": status.reconciled,
            "delta": status.delta,
        }
    })
}

fn address_pool_status_patch(pool: &AddressPool) -> serde_json::Value {
    let status = pool.status.clone().unwrap_or_default();
    serde_json::json!({
        "status": {
            "id": status.id,
            "inSync": status.in_sync,
            "reconciled": status.reconciled,
            "delta": status.delta,
        }
    })
}

#[async_trait::async_trait]
impl ResourceStore for KubeResourceStore {
    async fn list_platform_networks(&self, namespace: &str) -> Result<Vec<PlatformNetwork>, ControllerError> {
        let list = self.networks(namespace).list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn get_platform_network(&self, namespace: &str, name: &str) -> Result<Option<PlatformNetwork>, ControllerError> {
        Ok(self.networks(namespace).get_opt(name).await?)
    }

    async fn get_address_pool(&self, namespace: &str, name: &str) -> Result<Option<AddressPool>, ControllerError> {
        Ok(self.address_pools(namespace).get_opt(name).await?)
    }

    async fn update_network_status(&self, network: &PlatformNetwork) -> Result<(), ControllerError> {
        let name = network.name_any();
        let namespace = network.namespace().unwrap_or_default();
        debug!("Patching status of platform network {}/{}", namespace, name);

        self.networks(&namespace)
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(network_status_patch(network)))
            .await
            .map(|_| ())
            .map_err(|e| ControllerError::StatusUpdate { kind: "platform network", name, source: Box::new(e) })
    }

    async fn update_address_pool_status(&self, pool: &AddressPool) -> Result<(), ControllerError> {
        let name = pool.name_any();
        let namespace = pool.namespace().unwrap_or_default();
        debug!("Patching status of addresspool {}/{}", namespace, name);

        self.address_pools(&namespace)
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(address_pool_status_patch(pool)))
            .await
            .map(|_| ())
            .map_err(|e| ControllerError::StatusUpdate { kind: "addresspool", name, source: Box::new(e) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crds::{DeploymentScope, NetworkType};

    #[test]
    fn test_network_status_patch_omits_deployment_scope() {
        let mut network = test_network("oam", NetworkType::Oam, DeploymentScope::Day2, &[]);
        network.status_mut().id = Some("uuid-1".to_string());
        network.status_mut().delta = "\n\t+Name: oam".to_string();

        let patch = network_status_patch(&network);
        assert_eq!(patch["status"]["id"], "uuid-1");
        assert_eq!(patch["status"]["inSync"], false);
        assert_eq!(patch["status"]["delta"], "\n\t+Name: oam");
        assert!(patch["status"].get("deploymentScope").is_none());
    }

    #[test]
    fn test_address_pool_status_patch_clears_empty_delta() {
        let pool = test_address_pool("oam-ipv4", "10.10.10.0", 24);
        let patch = address_pool_status_patch(&pool);
        assert_eq!(patch["status"]["delta"], "");
        assert!(patch["status"]["id"].is_null());
    }
}
