//! Network to address-pool association convergence.
//!
//! A network holds at most one pool per IP family. A wrong association is
//! deleted and its replacement is only created on a later pass, once the
//! system no longer reports the stale one.

use super::policy::IpFamily;
use super::resolver::resolve;
use super::Reconciler;
use crate::error::ControllerError;
use crate::events::EventReason;
use crds::{AddressPool, PlatformNetwork};
use inventory_client::{AddressPool as RemoteAddressPool, NetworkAddressPool};
use kube::{Resource, ResourceExt};
use tracing::{debug, error, info};

/// What converging one association did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationAction {
    Created,
    AlreadyAssociated,
    DeletedStale,
    /// Network or pool does not exist on the system yet
    Skipped,
}

/// The association of `network_uuid` whose pool has the given family, with
/// that pool
pub fn find_family_association<'a>(
    network_uuid: &str,
    family: Option<IpFamily>,
    associations: &'a [NetworkAddressPool],
    pools: &'a [RemoteAddressPool],
) -> Option<(&'a NetworkAddressPool, &'a RemoteAddressPool)> {
    associations
        .iter()
        .filter(|a| a.network_uuid == network_uuid)
        .find_map(|a| {
            pools
                .iter()
                .find(|p| p.uuid == a.address_pool_uuid)
                .filter(|p| IpFamily::of(&p.network) == family)
                .map(|p| (a, p))
        })
}

impl Reconciler {
    /// Whether the network already has a pool of `pool`'s family associated
    pub(crate) async fn family_association_exists(
        &self,
        network: &PlatformNetwork,
        pool: &AddressPool,
    ) -> Result<bool, ControllerError> {
        let networks = self.inventory.list_networks().await?;
        let Some(remote_network) = resolve(network.status_id(), &network.name_any(), &networks) else {
            return Ok(false);
        };
        let associations = self.inventory.list_network_address_pools().await?;
        let pools = self.inventory.list_address_pools().await?;

        let family = IpFamily::of(&pool.spec.subnet);
        Ok(find_family_association(&remote_network.uuid, family, &associations, &pools).is_some())
    }

    /// Make the system associate `pool` with `network` for the pool's family
    pub(crate) async fn converge_association(
        &self,
        network: &PlatformNetwork,
        pool: &AddressPool,
    ) -> Result<AssociationAction, ControllerError> {
        let networks = self.inventory.list_networks().await?;
        let Some(remote_network) = resolve(network.status_id(), &network.name_any(), &networks) else {
            debug!("Platform network '{}' not on the system yet; association deferred", network.name_any());
            return Ok(AssociationAction::Skipped);
        };

        let associations = self.inventory.list_network_address_pools().await.map_err(|e| {
            error!("failed to fetch network-addresspools from system: {}", e);
            e
        })?;
        let pools = self.inventory.list_address_pools().await.map_err(|e| {
            error!("failed to fetch addresspools from system: {}", e);
            e
        })?;
        let Some(remote_pool) = resolve(pool.status_id(), &pool.name_any(), &pools) else {
            debug!("Addresspool '{}' not on the system yet; association deferred", pool.name_any());
            return Ok(AssociationAction::Skipped);
        };

        let family = IpFamily::of(&pool.spec.subnet);
        match find_family_association(&remote_network.uuid, family, &associations, &pools) {
            Some((association, associated)) if associated.uuid == remote_pool.uuid => {
                debug!(
                    "Found network-addresspool with {} - {}. No need to delete/recreate network-addresspool association.",
                    association.network_name, association.address_pool_name
                );
                Ok(AssociationAction::AlreadyAssociated)
            }
            Some((association, _)) => {
                self.inventory
                    .delete_network_address_pool(&association.uuid)
                    .await
                    .map_err(|e| {
                        error!("failed to delete associated network-addresspool: {}", e);
                        e
                    })?;
                let message = format!(
                    "Deleted network-addrpool object {} - {}",
                    association.network_name, association.address_pool_name
                );
                info!("{}", message);
                self.events
                    .notify(&network.object_ref(&()), EventReason::ResourceDeleted, message)
                    .await;
                Ok(AssociationAction::DeletedStale)
            }
            None => {
                self.inventory
                    .create_network_address_pool(&remote_network.uuid, &remote_pool.uuid)
                    .await
                    .map_err(|e| {
                        error!("there was an error creating new network-addresspool: {}", e);
                        e
                    })?;
                let message = format!(
                    "Created new network-addrpool association {} - {}",
                    remote_network.name, remote_pool.name
                );
                info!("{}", message);
                self.events
                    .notify(&network.object_ref(&()), EventReason::ResourceCreated, message)
                    .await;
                Ok(AssociationAction::Created)
            }
        }
    }
}
