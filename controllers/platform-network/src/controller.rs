//! Main controller implementation.
//!
//! Builds the production collaborators (inventory client, Kubernetes store
//! and event sink), runs one full pass over the watch namespace, then hands
//! over to the watch loop.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::events::KubeEventSink;
use crate::reconciler::Reconciler;
use crate::store::KubeResourceStore;
use crate::watcher::{self, Context};
use crds::{AddressPool, PlatformNetwork};
use inventory_client::{InventoryClient, InventoryClientTrait};
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Platform network controller process
pub struct Controller {
    network_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its watcher.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing platform network controller");

        let kube_client = Client::try_default().await?;

        let inventory = InventoryClient::new(config.inventory_url.clone(), config.inventory_token.clone())?;

        info!("Validating inventory token and connectivity...");
        inventory.validate_token().await.map_err(|e| {
            error!("Failed to validate inventory token: {}", e);
            error!("Please ensure:");
            error!("  1. INVENTORY_TOKEN environment variable is set correctly");
            error!("  2. The token has not expired");
            error!("  3. The inventory API is reachable at {}", config.inventory_url);
            ControllerError::Inventory(e)
        })?;
        info!("Inventory token validated and connectivity established");

        let reconciler = Arc::new(Reconciler::new(
            Box::new(inventory),
            Box::new(KubeResourceStore::new(kube_client.clone())),
            Box::new(KubeEventSink::new(kube_client.clone())),
            config.reconciler_enabled,
        ));

        info!("Performing startup reconciliation of namespace '{}'...", config.namespace);
        let errors = reconciler.reconcile_platform_networks(&config.namespace).await;
        if errors.is_empty() {
            info!("Startup reconciliation completed");
        } else {
            for e in &errors {
                warn!("Startup reconciliation: {}", e);
            }
            warn!("Startup reconciliation finished with {} error(s) (will continue)", errors.len());
        }

        let networks: Api<PlatformNetwork> = Api::namespaced(kube_client.clone(), &config.namespace);
        let pools: Api<AddressPool> = Api::namespaced(kube_client, &config.namespace);
        let ctx = Arc::new(Context { reconciler, resync: config.resync_interval });

        let network_watcher = tokio::spawn(async move { watcher::watch_platform_networks(networks, pools, ctx).await });

        Ok(Self { network_watcher })
    }

    /// Runs the controller until the watcher exits.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Platform network controller running");

        self.network_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("PlatformNetwork watcher panicked: {}", e)))?
            .map_err(|e| ControllerError::Watch(format!("PlatformNetwork watcher error: {}", e)))
    }
}
