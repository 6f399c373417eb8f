//! Inventory API client
//!
//! Implements the system inventory REST API for networks, address pools and
//! their associations. Based on the inventory API structure: /v1/networks,
//! /v1/addrpools, /v1/network_addrpools and /v1/isystems.

use crate::common::HttpClient;
use crate::error::InventoryError;
use crate::inventory_trait::InventoryClientTrait;
use crate::models::*;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Inventory API client
pub struct InventoryClient {
    http: HttpClient,
}

impl InventoryClient {
    /// Create a new inventory client
    ///
    /// # Arguments
    /// * `base_url` - Inventory API base URL (e.g., "http://sysinv-api.platform:6385")
    /// * `token` - Auth token sent as `X-Auth-Token`
    pub fn new(base_url: String, token: String) -> Result<Self, InventoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(InventoryError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token),
        })
    }
}

#[async_trait::async_trait]
impl InventoryClientTrait for InventoryClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn validate_token(&self) -> Result<(), InventoryError> {
        debug!("Validating inventory token and connectivity");
        self.get_system().await.map(|_| ())
    }

    async fn get_system(&self) -> Result<System, InventoryError> {
        let list: SystemList = self.http.get("/v1/isystems").await?;
        list.isystems
            .into_iter()
            .next()
            .ok_or_else(|| InventoryError::NotFound("no system record reported".to_string()))
    }

    async fn list_networks(&self) -> Result<Vec<Network>, InventoryError> {
        let list: NetworkList = self.http.get("/v1/networks").await?;
        debug!("Fetched {} networks", list.networks.len());
        Ok(list.networks)
    }

    async fn create_network(&self, opts: &NetworkOpts) -> Result<Network, InventoryError> {
        self.http.post("/v1/networks", &opts.to_create_body()).await
    }

    async fn update_network(&self, uuid: &str, opts: &NetworkOpts) -> Result<Network, InventoryError> {
        let body = serde_json::to_value(opts.to_patch())?;
        self.http.patch(&format!("/v1/networks/{}", uuid), &body).await
    }

    async fn list_address_pools(&self) -> Result<Vec<AddressPool>, InventoryError> {
        let list: AddressPoolList = self.http.get("/v1/addrpools").await?;
        debug!("Fetched {} address pools", list.addrpools.len());
        Ok(list.addrpools)
    }

    async fn create_address_pool(&self, opts: &AddressPoolOpts) -> Result<AddressPool, InventoryError> {
        self.http.post("/v1/addrpools", &opts.to_create_body()).await
    }

    async fn update_address_pool(&self, uuid: &str, opts: &AddressPoolOpts) -> Result<AddressPool, InventoryError> {
        let body = serde_json::to_value(opts.to_patch())?;
        self.http.patch(&format!("/v1/addrpools/{}", uuid), &body).await
    }

    async fn list_network_address_pools(&self) -> Result<Vec<NetworkAddressPool>, InventoryError> {
        let list: NetworkAddressPoolList = self.http.get("/v1/network_addrpools").await?;
        debug!("Fetched {} network-addresspool associations", list.network_addrpools.len());
        Ok(list.network_addrpools)
    }

    async fn create_network_address_pool(
        &self,
        network_uuid: &str,
        address_pool_uuid: &str,
    ) -> Result<NetworkAddressPool, InventoryError> {
        let body = serde_json::json!({
            "network_uuid": network_uuid,
            "address_pool_uuid": address_pool_uuid,
        });
        self.http.post("/v1/network_addrpools", &body).await
    }

    async fn delete_network_address_pool(&self, uuid: &str) -> Result<(), InventoryError> {
        self.http.delete(&format!("/v1/network_addrpools/{}", uuid)).await
    }
}
