//! InventoryClient trait for mocking
//!
//! This trait abstracts the InventoryClient to enable mocking in unit tests.
//! The concrete InventoryClient implements this trait, and tests can use mock implementations.

use crate::error::InventoryError;
use crate::models::*;

/// Trait for system inventory API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
/// No method retries; a failed call is reported to the caller as-is.
#[async_trait::async_trait]
pub trait InventoryClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API token
    async fn validate_token(&self) -> Result<(), InventoryError>;

    /// Get the system record (topology)
    async fn get_system(&self) -> Result<System, InventoryError>;

    // Networks
    async fn list_networks(&self) -> Result<Vec<Network>, InventoryError>;
    async fn create_network(&self, opts: &NetworkOpts) -> Result<Network, InventoryError>;
    async fn update_network(&self, uuid: &str, opts: &NetworkOpts) -> Result<Network, InventoryError>;

    // Address pools
    async fn list_address_pools(&self) -> Result<Vec<AddressPool>, InventoryError>;
    async fn create_address_pool(&self, opts: &AddressPoolOpts) -> Result<AddressPool, InventoryError>;
    async fn update_address_pool(&self, uuid: &str, opts: &AddressPoolOpts) -> Result<AddressPool, InventoryError>;

    // Network-address-pool associations
    async fn list_network_address_pools(&self) -> Result<Vec<NetworkAddressPool>, InventoryError>;
    async fn create_network_address_pool(&self, network_uuid: &str, address_pool_uuid: &str) -> Result<NetworkAddressPool, InventoryError>;
    async fn delete_network_address_pool(&self, uuid: &str) -> Result<(), InventoryError>;
}
