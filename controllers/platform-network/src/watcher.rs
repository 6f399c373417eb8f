//! PlatformNetwork watch loop.
//!
//! Runs a kube_runtime::Controller over PlatformNetwork resources. AddressPool
//! changes are mapped to every network that lists the pool, so editing a pool
//! re-runs the pairs it belongs to.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::{AddressPool, PlatformNetwork};
use futures::StreamExt;
use kube::{Api, ResourceExt};
use kube_runtime::controller::{Action, Config as RuntimeConfig};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconcile call
pub struct Context {
    pub reconciler: Arc<Reconciler>,
    /// Requeue delay after a clean pass
    pub resync: Duration,
}

fn resource_key(network: &PlatformNetwork) -> String {
    format!("{}/{}", network.namespace().unwrap_or_default(), network.name_any())
}

/// Networks in `pool`'s namespace that list it
pub fn networks_listing(networks: &[Arc<PlatformNetwork>], pool: &AddressPool) -> Vec<ObjectRef<PlatformNetwork>> {
    let name = pool.name_any();
    let namespace = pool.namespace();
    networks
        .iter()
        .filter(|n| n.namespace() == namespace && n.spec.associated_address_pools.contains(&name))
        .map(|n| ObjectRef::from_obj(n.as_ref()))
        .collect()
}

async fn reconcile(network: Arc<PlatformNetwork>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let namespace = network.namespace().unwrap_or_default();
    let name = network.name_any();
    debug!("Reconciling PlatformNetwork {}/{}", namespace, name);

    let errors = ctx.reconciler.reconcile_platform_network(&namespace, &name).await;
    ControllerError::from_batch(errors)?;

    ctx.reconciler.backoff.on_success(&resource_key(&network));
    Ok(Action::requeue(ctx.resync))
}

fn error_policy(network: Arc<PlatformNetwork>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = resource_key(&network);
    let delay = ctx.reconciler.backoff.on_failure(&key);
    if error.is_transport() {
        error!("Reconciliation of {} failed, retrying in {:?}: {}", key, delay, error);
    } else {
        warn!("Reconciliation of {} incomplete, retrying in {:?}: {}", key, delay, error);
    }
    Action::requeue(delay)
}

/// Watch PlatformNetworks (and the AddressPools they list) in `namespace`
/// until the stream ends.
pub async fn watch_platform_networks(
    networks: Api<PlatformNetwork>,
    pools: Api<AddressPool>,
    ctx: Arc<Context>,
) -> Result<(), ControllerError> {
    info!("Starting PlatformNetwork watcher");

    // One pass at a time, debounced
    let runtime_config = RuntimeConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(1);

    let controller = Controller::new(networks, watcher::Config::default());
    let store = controller.store();
    controller
        .watches(pools, watcher::Config::default(), move |pool: AddressPool| {
            networks_listing(&store.state(), &pool)
        })
        .with_config(runtime_config)
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!("Reconciled PlatformNetwork {}", obj.name),
                Err(e) => error!("Controller error for PlatformNetwork: {}", e),
            }
        })
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_address_pool, test_network};
    use crds::{DeploymentScope, NetworkType};

    #[test]
    fn test_pool_maps_to_listing_networks() {
        let networks = vec![
            Arc::new(test_network("mgmt", NetworkType::Mgmt, DeploymentScope::Bootstrap, &["mgmt-ipv4"])),
            Arc::new(test_network(
                "cluster-host",
                NetworkType::ClusterHost,
                DeploymentScope::Bootstrap,
                &["cluster-host-ipv4", "shared-ipv6"],
            )),
            Arc::new(test_network("pxeboot", NetworkType::Pxeboot, DeploymentScope::Bootstrap, &["shared-ipv6"])),
        ];

        let refs = networks_listing(&networks, &test_address_pool("shared-ipv6", "fd00::", 64));
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["cluster-host", "pxeboot"]);

        assert!(networks_listing(&networks, &test_address_pool("unused", "10.0.0.0", 24)).is_empty());
    }

    #[test]
    fn test_pool_in_other_namespace_maps_to_nothing() {
        let networks = vec![Arc::new(test_network(
            "mgmt",
            NetworkType::Mgmt,
            DeploymentScope::Bootstrap,
            &["mgmt-ipv4"],
        ))];
        let mut pool = test_address_pool("mgmt-ipv4", "192.168.204.0", 24);
        pool.metadata.namespace = Some("elsewhere".to_string());

        assert!(networks_listing(&networks, &pool).is_empty());
    }
}
