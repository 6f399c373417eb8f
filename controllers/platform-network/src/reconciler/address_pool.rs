//! AddressPool step: resolve, diff, gate, validate, apply.
//!
//! A pool is always reconciled in the context of the network that lists it:
//! the network's type selects the validation rules and its scope drives the
//! gate.

use super::diff::{diff_address_pool, AddressPoolDiff};
use super::gate::{should_reconcile, GateTarget};
use super::policy::policy_for;
use super::resolver::resolve;
use super::validation::is_valid_address_pool;
use super::{Outcome, Reconciler, StepResult};
use crate::error::ControllerError;
use crate::events::EventReason;
use crds::{AddressPool, DeploymentScope, PlatformNetwork};
use inventory_client::AddressPool as RemoteAddressPool;
use kube::{Resource, ResourceExt};
use tracing::{debug, error, info};

impl Reconciler {
    async fn fetch_remote_address_pool(&self, pool: &AddressPool) -> Result<Option<RemoteAddressPool>, ControllerError> {
        let pools = self.inventory.list_address_pools().await.map_err(|e| {
            error!("failed to fetch addresspools from system: {}", e);
            e
        })?;
        Ok(resolve(pool.status_id(), &pool.name_any(), &pools).cloned())
    }

    async fn sync_address_pool_id(&self, pool: &mut AddressPool, remote: Option<&RemoteAddressPool>) {
        let Some(remote) = remote else { return };
        if pool.status_id() == Some(remote.uuid.as_str()) {
            return;
        }
        pool.status_mut().id = Some(remote.uuid.clone());
        if let Err(e) = self.store.update_address_pool_status(pool).await {
            error!("failed to update '{}' addresspool UUID: {}", pool.name_any(), e);
        }
    }

    async fn record_address_pool_delta(&self, pool: &mut AddressPool, delta: &str) {
        if !delta.is_empty() {
            info!("delta configuration:{}", delta);
        }
        pool.status_mut().delta = delta.to_string();
        if let Err(e) = self.store.update_address_pool_status(pool).await {
            error!("failed to update '{}' addresspool delta: {}", pool.name_any(), e);
        }
    }

    async fn apply_address_pool(&self, pool: &AddressPool, diff: &AddressPoolDiff) -> Result<(), ControllerError> {
        let name = pool.name_any();
        let (reason, message) = match &diff.remote_id {
            None => {
                self.inventory.create_address_pool(&diff.opts).await.map_err(|e| {
                    error!("failed to create addresspool {:?}: {}", diff.opts, e);
                    e
                })?;
                (EventReason::ResourceCreated, format!("addresspool '{}' has been created", name))
            }
            Some(uuid) => {
                self.inventory.update_address_pool(uuid, &diff.opts).await.map_err(|e| {
                    error!("failed to update addresspool {:?}: {}", diff.opts, e);
                    e
                })?;
                (EventReason::ResourceUpdated, format!("addresspool '{}' has been updated", name))
            }
        };
        info!("{}", message);
        self.events.notify(&pool.object_ref(&()), reason, message).await;
        Ok(())
    }

    async fn address_pool_allowed(&self, network: &PlatformNetwork, pool: &AddressPool) -> Result<bool, ControllerError> {
        let scope = network.deployment_scope();
        let network_type = network.spec.network_type;

        // Only matters when the gate could otherwise allow the change
        let family_associated = if scope == DeploymentScope::Bootstrap && !policy_for(network_type).bootstrap_blocked {
            self.family_association_exists(network, pool).await?
        } else {
            false
        };

        Ok(should_reconcile(scope, network_type, GateTarget::AddressPool { family_associated }))
    }

    /// Run the pool step for `pool` as listed by `network`. `Err` means the
    /// system could not be read and nothing was decided.
    pub(crate) async fn reconcile_address_pool_step(
        &self,
        network: &PlatformNetwork,
        pool: &mut AddressPool,
    ) -> Result<StepResult, ControllerError> {
        let name = pool.name_any();
        let remote = self.fetch_remote_address_pool(pool).await?;
        self.sync_address_pool_id(pool, remote.as_ref()).await;

        let network_type = network.spec.network_type;
        let diff = diff_address_pool(network_type, &name, &pool.spec, remote.as_ref());
        self.record_address_pool_delta(pool, &diff.delta).await;

        let allowed = self.address_pool_allowed(network, pool).await?;
        let system = self.inventory.get_system().await?;
        let validated = is_valid_address_pool(network_type, &system, &name, &pool.spec);

        if allowed && validated && diff.update_required {
            if let Err(e) = self.apply_address_pool(pool, &diff).await {
                return Ok(StepResult { outcome: Outcome::TransportError(e), allowed, validated });
            }
            let remote = self.fetch_remote_address_pool(pool).await?;
            self.sync_address_pool_id(pool, remote.as_ref()).await;
            return Ok(StepResult { outcome: Outcome::Success, allowed, validated });
        }

        if !validated {
            // Needs a user edit, so there is nothing to retry. Validation only
            // guards pools that still need changes; one already matching the
            // system counts as valid.
            let outcome = if diff.update_required { Outcome::ValidationFailed } else { Outcome::Success };
            return Ok(StepResult { outcome, allowed, validated: !diff.update_required });
        }

        if diff.update_required {
            info!("There is delta between applied spec and system for addresspool '{}'", name);
            return Ok(StepResult { outcome: Outcome::Blocked, allowed, validated });
        }

        debug!("Addresspool '{}' matches the system", name);
        Ok(StepResult { outcome: Outcome::Success, allowed, validated })
    }
}
