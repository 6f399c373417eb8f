//! Address pool and association operations for MockInventoryClient

use super::{MockCall, MockInventoryClient};
use crate::error::InventoryError;
use crate::models::*;
use std::net::IpAddr;

fn is_ipv6(subnet: &str) -> Option<bool> {
    subnet.parse::<IpAddr>().ok().map(|ip| ip.is_ipv6())
}

fn apply(field: &mut Option<String>, update: &FieldUpdate<String>) {
    match update {
        FieldUpdate::Unchanged => {}
        FieldUpdate::Set(value) => *field = Some(value.clone()),
        FieldUpdate::Clear => *field = None,
    }
}

pub async fn list_address_pools(client: &MockInventoryClient) -> Result<Vec<AddressPool>, InventoryError> {
    client.check_failure("list_address_pools")?;
    let mut pools: Vec<AddressPool> = client.address_pools.lock().unwrap().values().cloned().collect();
    pools.sort_by(|a, b| a.uuid.cmp(&b.uuid));
    Ok(pools)
}

pub async fn create_address_pool(client: &MockInventoryClient, opts: &AddressPoolOpts) -> Result<AddressPool, InventoryError> {
    client.check_failure("create_address_pool")?;
    client.record(MockCall::CreateAddressPool(opts.clone()));

    let name = opts
        .name
        .clone()
        .ok_or_else(|| InventoryError::InvalidRequest("address pool name is required".to_string()))?;
    if client.address_pool_by_name(&name).is_some() {
        return Err(InventoryError::Conflict(format!("address pool {} already exists", name)));
    }

    let pool = AddressPool {
        uuid: client.next_uuid(),
        name,
        network: opts.network.clone().unwrap_or_default(),
        prefix: opts.prefix.unwrap_or_default(),
        order: opts.order.clone(),
        ranges: opts.ranges.clone().unwrap_or_default(),
        floating_address: opts.floating_address.as_set().cloned(),
        controller0_address: opts.controller0_address.as_set().cloned(),
        controller1_address: opts.controller1_address.as_set().cloned(),
        gateway_address: opts.gateway_address.as_set().cloned(),
        created_at: Some(chrono::Utc::now()),
        updated_at: None,
    };
    client.add_address_pool(pool.clone());
    Ok(pool)
}

pub async fn update_address_pool(client: &MockInventoryClient, uuid: &str, opts: &AddressPoolOpts) -> Result<AddressPool, InventoryError> {
    client.check_failure("update_address_pool")?;
    client.record(MockCall::UpdateAddressPool(uuid.to_string(), opts.clone()));

    let mut pools = client.address_pools.lock().unwrap();
    let pool = pools
        .get_mut(uuid)
        .ok_or_else(|| InventoryError::NotFound(format!("Address pool {} not found", uuid)))?;
    if let Some(name) = &opts.name {
        pool.name = name.clone();
    }
    if let Some(network) = &opts.network {
        pool.network = network.clone();
    }
    if let Some(prefix) = opts.prefix {
        pool.prefix = prefix;
    }
    apply(&mut pool.floating_address, &opts.floating_address);
    apply(&mut pool.controller0_address, &opts.controller0_address);
    apply(&mut pool.controller1_address, &opts.controller1_address);
    apply(&mut pool.gateway_address, &opts.gateway_address);
    if let Some(order) = &opts.order {
        pool.order = Some(order.clone());
    }
    if let Some(ranges) = &opts.ranges {
        pool.ranges = ranges.clone();
    }
    pool.updated_at = Some(chrono::Utc::now());
    Ok(pool.clone())
}

pub async fn list_network_address_pools(client: &MockInventoryClient) -> Result<Vec<NetworkAddressPool>, InventoryError> {
    client.check_failure("list_network_address_pools")?;
    let mut associations = client.network_address_pools();
    associations.sort_by(|a, b| a.uuid.cmp(&b.uuid));
    Ok(associations)
}

pub async fn create_network_address_pool(
    client: &MockInventoryClient,
    network_uuid: &str,
    address_pool_uuid: &str,
) -> Result<NetworkAddressPool, InventoryError> {
    client.check_failure("create_network_address_pool")?;
    client.record(MockCall::CreateNetworkAddressPool {
        network_uuid: network_uuid.to_string(),
        address_pool_uuid: address_pool_uuid.to_string(),
    });

    let network_name = client
        .networks
        .lock()
        .unwrap()
        .get(network_uuid)
        .map(|n| n.name.clone())
        .ok_or_else(|| InventoryError::NotFound(format!("Network {} not found", network_uuid)))?;
    let (pool_name, family) = {
        let pools = client.address_pools.lock().unwrap();
        let pool = pools
            .get(address_pool_uuid)
            .ok_or_else(|| InventoryError::NotFound(format!("Address pool {} not found", address_pool_uuid)))?;
        (pool.name.clone(), is_ipv6(&pool.network))
    };

    // The system allows one pool per family on a network
    {
        let pools = client.address_pools.lock().unwrap();
        let clash = client.associations.lock().unwrap().values().any(|a| {
            a.network_uuid == network_uuid
                && pools
                    .get(&a.address_pool_uuid)
                    .map(|p| is_ipv6(&p.network) == family)
                    .unwrap_or(false)
        });
        if clash {
            return Err(InventoryError::Conflict(format!(
                "network {} already has an address pool of the same family",
                network_name
            )));
        }
    }

    let association = NetworkAddressPool {
        uuid: client.next_uuid(),
        network_uuid: network_uuid.to_string(),
        address_pool_uuid: address_pool_uuid.to_string(),
        network_name,
        address_pool_name: pool_name,
    };
    client.add_network_address_pool(association.clone());
    Ok(association)
}

pub async fn delete_network_address_pool(client: &MockInventoryClient, uuid: &str) -> Result<(), InventoryError> {
    client.check_failure("delete_network_address_pool")?;
    client.record(MockCall::DeleteNetworkAddressPool(uuid.to_string()));

    client
        .associations
        .lock()
        .unwrap()
        .remove(uuid)
        .map(|_| ())
        .ok_or_else(|| InventoryError::NotFound(format!("Network address pool {} not found", uuid)))
}
