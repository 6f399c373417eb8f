//! PlatformNetwork step: resolve, diff, gate, apply.

use super::diff::{diff_network, NetworkDiff};
use super::gate::{should_reconcile, GateTarget};
use super::resolver::resolve;
use super::{Outcome, Reconciler, StepResult};
use crate::error::ControllerError;
use crate::events::EventReason;
use crds::PlatformNetwork;
use inventory_client::Network as RemoteNetwork;
use kube::{Resource, ResourceExt};
use tracing::{debug, error, info};

impl Reconciler {
    async fn fetch_remote_network(&self, network: &PlatformNetwork) -> Result<Option<RemoteNetwork>, ControllerError> {
        let networks = self.inventory.list_networks().await.map_err(|e| {
            error!("failed to fetch networks from system: {}", e);
            e
        })?;
        Ok(resolve(network.status_id(), &network.name_any(), &networks).cloned())
    }

    /// Track the remote uuid in status. A failed write is only logged, the
    /// name lookup covers a missing or stale id.
    async fn sync_network_id(&self, network: &mut PlatformNetwork, remote: Option<&RemoteNetwork>) {
        let Some(remote) = remote else { return };
        if network.status_id() == Some(remote.uuid.as_str()) {
            return;
        }
        network.status_mut().id = Some(remote.uuid.clone());
        if let Err(e) = self.store.update_network_status(network).await {
            error!("failed to update '{}' platform network UUID: {}", network.name_any(), e);
        }
    }

    async fn record_network_delta(&self, network: &mut PlatformNetwork, delta: &str) {
        if !delta.is_empty() {
            info!("delta configuration:{}", delta);
        }
        network.status_mut().delta = delta.to_string();
        if let Err(e) = self.store.update_network_status(network).await {
            error!("failed to update '{}' platform network delta: {}", network.name_any(), e);
        }
    }

    async fn apply_network(&self, network: &PlatformNetwork, diff: &NetworkDiff) -> Result<(), ControllerError> {
        let name = network.name_any();
        let (reason, message) = match &diff.remote_id {
            None => {
                self.inventory.create_network(&diff.opts).await.map_err(|e| {
                    error!("failed to create platform network {:?}: {}", diff.opts, e);
                    e
                })?;
                (EventReason::ResourceCreated, format!("platform network '{}' has been created", name))
            }
            Some(uuid) => {
                self.inventory.update_network(uuid, &diff.opts).await.map_err(|e| {
                    error!("failed to update platform network {:?}: {}", diff.opts, e);
                    e
                })?;
                (EventReason::ResourceUpdated, format!("platform network '{}' has been updated", name))
            }
        };
        info!("{}", message);
        self.events.notify(&network.object_ref(&()), reason, message).await;
        Ok(())
    }

    /// Run the network step. `Err` means the system could not be read and the
    /// gate was never consulted.
    pub(crate) async fn reconcile_network_step(&self, network: &mut PlatformNetwork) -> Result<StepResult, ControllerError> {
        let remote = self.fetch_remote_network(network).await?;
        self.sync_network_id(network, remote.as_ref()).await;

        let diff = diff_network(&network.name_any(), &network.spec, remote.as_ref());
        self.record_network_delta(network, &diff.delta).await;

        let allowed = should_reconcile(
            network.deployment_scope(),
            network.spec.network_type,
            GateTarget::Network { remote_id_known: diff.remote_id.is_some() },
        );

        if !diff.update_required {
            debug!("Platform network '{}' matches the system", network.name_any());
            return Ok(StepResult { outcome: Outcome::Success, allowed, validated: true });
        }
        if !allowed {
            info!(
                "There is delta between applied spec and system for platform network '{}'",
                network.name_any()
            );
            return Ok(StepResult { outcome: Outcome::Blocked, allowed, validated: true });
        }

        if let Err(e) = self.apply_network(network, &diff).await {
            return Ok(StepResult { outcome: Outcome::TransportError(e), allowed, validated: true });
        }

        let remote = self.fetch_remote_network(network).await?;
        self.sync_network_id(network, remote.as_ref()).await;
        Ok(StepResult { outcome: Outcome::Success, allowed, validated: true })
    }
}
