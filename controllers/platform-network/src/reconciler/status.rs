//! Reconciliation status flags and their change notifications.

use super::{Reconciler, StepResult};
use crate::error::ControllerError;
use crate::events::EventReason;
use crds::{AddressPool, DeploymentScope, PlatformNetwork};
use kube::{Resource, ResourceExt};
use tracing::error;

/// `inSync` / `reconciled` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncFlags {
    pub in_sync: bool,
    pub reconciled: bool,
}

/// Flags after a step. They only move while the owning network is in
/// bootstrap; a refused step still counts as reconciled so that types which
/// cannot be configured in this phase do not raise alarms.
pub fn next_flags(current: SyncFlags, scope: DeploymentScope, allowed: bool, is_reconciled: bool) -> SyncFlags {
    match scope {
        DeploymentScope::Bootstrap => SyncFlags {
            in_sync: is_reconciled,
            reconciled: if allowed { is_reconciled } else { true },
        },
        DeploymentScope::Day2 => current,
    }
}

impl Reconciler {
    /// Update and persist the network's flags, emitting an event when
    /// `inSync` changed
    pub(crate) async fn record_network_status(
        &self,
        network: &mut PlatformNetwork,
        step: &StepResult,
    ) -> Result<(), ControllerError> {
        let scope = network.deployment_scope();
        let status = network.status_mut();
        let old = SyncFlags { in_sync: status.in_sync, reconciled: status.reconciled };
        let new = next_flags(old, scope, step.allowed, step.is_reconciled());
        status.in_sync = new.in_sync;
        status.reconciled = new.reconciled;

        self.store.update_network_status(network).await.map_err(|e| {
            error!("failed to update '{}' platform network status: {}", network.name_any(), e);
            e
        })?;

        if old.in_sync != new.in_sync {
            let message = format!(
                "{} network's synchronization has changed to: {}",
                network.name_any(),
                new.in_sync
            );
            self.events
                .notify(&network.object_ref(&()), EventReason::ResourceUpdated, message)
                .await;
        }
        Ok(())
    }

    /// Same as `record_network_status` for a pool, which follows the scope of
    /// its network
    pub(crate) async fn record_address_pool_status(
        &self,
        network: &PlatformNetwork,
        pool: &mut AddressPool,
        step: &StepResult,
    ) -> Result<(), ControllerError> {
        let status = pool.status_mut();
        let old = SyncFlags { in_sync: status.in_sync, reconciled: status.reconciled };
        let new = next_flags(old, network.deployment_scope(), step.allowed, step.is_reconciled());
        status.in_sync = new.in_sync;
        status.reconciled = new.reconciled;

        self.store.update_address_pool_status(pool).await.map_err(|e| {
            error!("failed to update '{}' addresspool status: {}", pool.name_any(), e);
            e
        })?;

        if old.in_sync != new.in_sync {
            let message = format!(
                "{} addresspool's synchronization has changed to: {}",
                pool.name_any(),
                new.in_sync
            );
            self.events
                .notify(&pool.object_ref(&()), EventReason::ResourceUpdated, message)
                .await;
        }
        Ok(())
    }
}
