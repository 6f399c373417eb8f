//! Network-type specific validation of address pools.
//!
//! These checks depend on the network a pool is attached to and on the system
//! topology, so they cannot be done by schema validation. A failure is not an
//! error: the pool is left alone until the user fixes the spec.

use super::policy::{policy_for, IpFamily, RequiredField};
use crds::{AddressPoolSpec, NetworkType};
use inventory_client::System;
use tracing::info;

/// Outcome of validating a pool for a network type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    MissingFields(Vec<RequiredField>),
    WrongFamily,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

pub fn validate_address_pool(network_type: NetworkType, system: &System, spec: &AddressPoolSpec) -> Validation {
    let policy = policy_for(network_type);

    let missing: Vec<RequiredField> = policy
        .required_fields(system.is_single_node_simplex())
        .iter()
        .copied()
        .filter(|field| !field.is_set(spec))
        .collect();
    if !missing.is_empty() {
        return Validation::MissingFields(missing);
    }

    if policy.ipv4_only && IpFamily::of(&spec.subnet) == Some(IpFamily::V6) {
        return Validation::WrongFamily;
    }

    Validation::Valid
}

/// `validate_address_pool` with the failure reason logged
pub fn is_valid_address_pool(
    network_type: NetworkType,
    system: &System,
    pool_name: &str,
    spec: &AddressPoolSpec,
) -> bool {
    match validate_address_pool(network_type, system, spec) {
        Validation::Valid => true,
        Validation::MissingFields(fields) => {
            let names: Vec<String> = fields.iter().map(|f| format!("'{}'", f)).collect();
            info!(
                "The {} are mandatory parameters for {} address pools. AddressPool '{}' will not be reconciled.",
                names.join(", "),
                network_type,
                pool_name
            );
            false
        }
        Validation::WrongFamily => {
            info!(
                "Network of type {} only supports pool of family IPv4. AddressPool '{}' will not be reconciled.",
                network_type, pool_name
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{multinode_system, simplex_system, test_address_pool};

    #[test]
    fn test_oam_simplex_requires_floating_and_gateway() {
        let mut pool = test_address_pool("oam", "10.10.10.0", 24);
        assert_eq!(
            validate_address_pool(NetworkType::Oam, &simplex_system(), &pool.spec),
            Validation::MissingFields(vec![RequiredField::FloatingAddress, RequiredField::Gateway])
        );

        pool.spec.floating_address = Some("10.10.10.2".to_string());
        pool.spec.gateway = Some("10.10.10.1".to_string());
        assert!(validate_address_pool(NetworkType::Oam, &simplex_system(), &pool.spec).is_valid());
        assert!(!validate_address_pool(NetworkType::Oam, &multinode_system(), &pool.spec).is_valid());
    }

    #[test]
    fn test_controller_addresses_required_for_cluster_networks() {
        let mut pool = test_address_pool("cluster-host", "192.168.206.0", 24);
        pool.spec.floating_address = Some("192.168.206.2".to_string());
        pool.spec.controller0_address = Some("192.168.206.3".to_string());
        assert_eq!(
            validate_address_pool(NetworkType::ClusterHost, &multinode_system(), &pool.spec),
            Validation::MissingFields(vec![RequiredField::Controller1Address])
        );

        pool.spec.controller1_address = Some("192.168.206.4".to_string());
        assert!(validate_address_pool(NetworkType::ClusterHost, &multinode_system(), &pool.spec).is_valid());
    }

    #[test]
    fn test_pxeboot_rejects_ipv6() {
        let mut pool = test_address_pool("pxeboot", "fd02::", 64);
        pool.spec.floating_address = Some("fd02::2".to_string());
        pool.spec.controller0_address = Some("fd02::3".to_string());
        pool.spec.controller1_address = Some("fd02::4".to_string());
        assert_eq!(
            validate_address_pool(NetworkType::Pxeboot, &multinode_system(), &pool.spec),
            Validation::WrongFamily
        );
        assert!(validate_address_pool(NetworkType::Mgmt, &multinode_system(), &pool.spec).is_valid());
    }

    #[test]
    fn test_admin_and_other_always_pass() {
        let pool = test_address_pool("bare", "10.20.0.0", 16);
        assert!(validate_address_pool(NetworkType::Admin, &multinode_system(), &pool.spec).is_valid());
        assert!(validate_address_pool(NetworkType::Other, &simplex_system(), &pool.spec).is_valid());
        assert!(is_valid_address_pool(NetworkType::Other, &simplex_system(), "bare", &pool.spec));
    }
}
