//! Platform Network Controller
//!
//! Converges PlatformNetwork and AddressPool resources against the system
//! inventory API:
//! - PlatformNetwork: creates the network record during bootstrap
//! - AddressPool: creates the pool and associates it with its network
//!
//! Reconfiguration of existing records is reported as drift in status, never
//! applied.

mod backoff;
mod config;
mod controller;
mod error;
mod events;
mod reconciler;
mod store;
mod watcher;
#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    // kube and reqwest both use rustls; pin the process-wide provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Platform Network Controller");

    let config = ControllerConfig::from_env()?;
    info!("Configuration:");
    info!("  Inventory URL: {}", config.inventory_url);
    info!("  Namespace: {}", config.namespace);
    info!("  Resync interval: {:?}", config.resync_interval);
    info!("  Reconciler enabled: {}", config.reconciler_enabled);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
