//! Reconciliation of PlatformNetwork and AddressPool resources.
//!
//! Every (network, pool) pair listed by a PlatformNetwork goes through the
//! same pipeline: the network step, then the pool step, then the association
//! between the two. Each step resolves the remote record, diffs it against
//! the spec, asks the gate whether a change may be applied, applies it, and
//! records status.
//!
//! - `policy`: per network type rules
//! - `resolver`: remote record lookup
//! - `diff`: spec vs system comparison
//! - `validation`: network-type specific pool validation
//! - `gate`: bootstrap change control
//! - `association`: network to pool linkage
//! - `status`: status flags and change events

pub mod address_pool;
pub mod association;
pub mod diff;
pub mod gate;
pub mod network;
pub mod policy;
pub mod resolver;
pub mod status;
pub mod validation;


use crate::backoff::BackoffTracker;
use crate::error::ControllerError;
use crate::events::EventSink;
use crate::store::ResourceStore;
use crds::{AddressPool, DeploymentScope, PlatformNetwork};
use inventory_client::InventoryClientTrait;
use kube::ResourceExt;
use tracing::{debug, error};

/// How a network or pool step ended
#[derive(Debug)]
pub enum Outcome {
    /// Nothing to do, or the change was applied
    Success,
    /// A change is needed but the gate refused it
    Blocked,
    /// A change is needed but the pool spec is incomplete for its network
    ValidationFailed,
    /// Applying an allowed change failed
    TransportError(ControllerError),
}

/// Result of one step
#[derive(Debug)]
pub struct StepResult {
    pub outcome: Outcome,
    /// Gate decision
    pub allowed: bool,
    /// Validation result, always true for networks
    pub validated: bool,
}

impl StepResult {
    pub fn is_reconciled(&self) -> bool {
        matches!(self.outcome, Outcome::Success) && self.validated
    }
}

/// Reconciles platform networks and their address pools against the system.
pub struct Reconciler {
    pub(crate) inventory: Box<dyn InventoryClientTrait>,
    pub(crate) store: Box<dyn ResourceStore>,
    pub(crate) events: Box<dyn EventSink>,
    enabled: bool,
    /// Requeue backoff per `namespace/name`
    pub(crate) backoff: BackoffTracker,
}

impl Reconciler {
    pub fn new(
        inventory: Box<dyn InventoryClientTrait>,
        store: Box<dyn ResourceStore>,
        events: Box<dyn EventSink>,
        enabled: bool,
    ) -> Self {
        Self {
            inventory,
            store,
            events,
            enabled,
            backoff: BackoffTracker::new(),
        }
    }

    /// Reconcile every PlatformNetwork in `namespace`. Failures of one pair do
    /// not stop the others; all errors are returned together.
    pub async fn reconcile_platform_networks(&self, namespace: &str) -> Vec<ControllerError> {
        if !self.enabled {
            debug!("Platform network reconciler is disabled");
            return Vec::new();
        }

        let networks = match self.store.list_platform_networks(namespace).await {
            Ok(networks) => networks,
            Err(e) => {
                error!("failed to list platform networks: {}", e);
                return vec![e];
            }
        };

        let mut errors = Vec::new();
        for listed in networks {
            let name = listed.name_any();
            match self.store.get_platform_network(namespace, &name).await {
                Ok(Some(network)) => errors.extend(self.reconcile_pairs(network).await),
                Ok(None) => {
                    error!("Failed to get platform network {}/{}", namespace, name);
                    errors.push(ControllerError::NetworkNotFound(format!("{}/{}", namespace, name)));
                }
                Err(e) => {
                    error!("Failed to get platform network {}/{}: {}", namespace, name, e);
                    errors.push(e);
                }
            }
        }
        errors
    }

    /// Reconcile one PlatformNetwork. A network deleted in the meantime is
    /// not an error.
    pub async fn reconcile_platform_network(&self, namespace: &str, name: &str) -> Vec<ControllerError> {
        if !self.enabled {
            debug!("Platform network reconciler is disabled");
            return Vec::new();
        }

        match self.store.get_platform_network(namespace, name).await {
            Ok(Some(network)) => self.reconcile_pairs(network).await,
            Ok(None) => {
                debug!("Platform network {}/{} no longer exists", namespace, name);
                Vec::new()
            }
            Err(e) => vec![e],
        }
    }

    async fn reconcile_pairs(&self, mut network: PlatformNetwork) -> Vec<ControllerError> {
        let mut errors = Vec::new();
        if network.deployment_scope() == DeploymentScope::Day2 {
            debug!("Platform network '{}' is in day2 scope; skipping", network.name_any());
            return errors;
        }

        let namespace = network.namespace().unwrap_or_default();
        for pool_name in network.spec.associated_address_pools.clone() {
            match self.store.get_address_pool(&namespace, &pool_name).await {
                Ok(Some(pool)) => errors.extend(self.reconcile_pair(&mut network, pool).await),
                Ok(None) => {
                    error!("Failed to get addrpool {}/{}", namespace, pool_name);
                    errors.push(ControllerError::AddressPoolNotFound(format!("{}/{}", namespace, pool_name)));
                }
                Err(e) => {
                    error!("Failed to get addrpool {}/{}: {}", namespace, pool_name, e);
                    errors.push(e);
                }
            }
        }
        errors
    }

    /// Network step, pool step, then association. A read failure before a
    /// gate decision, a failed allowed change, or a failed status write stops
    /// the pair. A refused change is reported as drift without stopping it.
    async fn reconcile_pair(&self, network: &mut PlatformNetwork, mut pool: AddressPool) -> Vec<ControllerError> {
        let mut errors = Vec::new();

        let step = match self.reconcile_network_step(network).await {
            Ok(step) => step,
            Err(e) => {
                errors.push(e);
                return errors;
            }
        };
        let status_result = self.record_network_status(network, &step).await;
        match step.outcome {
            Outcome::TransportError(e) => {
                errors.push(e);
                errors.extend(status_result.err());
                return errors;
            }
            Outcome::Blocked => errors.push(ControllerError::Drift {
                kind: "platform network",
                name: network.name_any(),
            }),
            Outcome::Success | Outcome::ValidationFailed => {}
        }
        if let Err(e) = status_result {
            errors.push(e);
            return errors;
        }

        let step = match self.reconcile_address_pool_step(network, &mut pool).await {
            Ok(step) => step,
            Err(e) => {
                errors.push(e);
                return errors;
            }
        };
        let status_result = self.record_address_pool_status(network, &mut pool, &step).await;

        if step.allowed && step.is_reconciled() {
            debug!(
                "Updating network-addresspool association for network '{}' and addrpool '{}'",
                network.name_any(),
                pool.name_any()
            );
            match self.converge_association(network, &pool).await {
                Ok(action) => debug!(
                    "Association of '{}' with '{}': {:?}",
                    network.name_any(),
                    pool.name_any(),
                    action
                ),
                Err(e) => {
                    errors.push(e);
                    errors.extend(status_result.err());
                    return errors;
                }
            }
        }

        match step.outcome {
            Outcome::TransportError(e) => errors.push(e),
            Outcome::Blocked => errors.push(ControllerError::Drift {
                kind: "addresspool",
                name: pool.name_any(),
            }),
            Outcome::Success | Outcome::ValidationFailed => {}
        }
        errors.extend(status_result.err());
        errors
    }
}
