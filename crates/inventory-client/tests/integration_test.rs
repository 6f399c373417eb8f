//! Integration tests for the inventory client
//!
//! These tests require a reachable inventory API.
//! Set INVENTORY_URL and INVENTORY_TOKEN environment variables to run.

use inventory_client::{InventoryClient, InventoryClientTrait};

fn client() -> InventoryClient {
    let url = std::env::var("INVENTORY_URL")
        .unwrap_or_else(|_| "http://localhost:6385".to_string());
    let token = std::env::var("INVENTORY_TOKEN")
        .expect("INVENTORY_TOKEN environment variable must be set");

    InventoryClient::new(url, token).expect("Failed to create client")
}

#[tokio::test]
#[ignore] // Requires running inventory API
async fn test_validate_token() {
    let client = client();
    client.validate_token().await.expect("Token validation failed");
}

#[tokio::test]
#[ignore]
async fn test_get_system() {
    let system = client().get_system().await.expect("Failed to get system");
    println!(
        "System {} is {} / {} (single node simplex: {})",
        system.name,
        system.system_type,
        system.system_mode,
        system.is_single_node_simplex()
    );
}

#[tokio::test]
#[ignore]
async fn test_list_networks_and_pools() {
    let client = client();

    let networks = client.list_networks().await.expect("Failed to list networks");
    println!("Found {} networks", networks.len());

    let pools = client.list_address_pools().await.expect("Failed to list address pools");
    println!("Found {} address pools", pools.len());

    let associations = client
        .list_network_address_pools()
        .await
        .expect("Failed to list network address pools");
    for association in &associations {
        assert!(
            networks.iter().any(|n| n.uuid == association.network_uuid),
            "association {} references an unknown network",
            association.uuid
        );
    }
}

#[tokio::test]
#[ignore]
async fn test_rejects_bad_token() {
    let url = std::env::var("INVENTORY_URL")
        .unwrap_or_else(|_| "http://localhost:6385".to_string());
    let client = InventoryClient::new(url, "not-a-token".to_string()).expect("Failed to create client");

    let result = client.list_networks().await;
    assert!(matches!(result, Err(inventory_client::InventoryError::Authentication(_))));
}
