//! Per-network-type policy.
//!
//! One table answers every type-specific question asked by validation, the
//! reconciliation gate and the diff engine.

use crds::{AddressPoolSpec, NetworkType};
use std::fmt;
use std::net::IpAddr;

/// Optional address-pool field that a network type may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    FloatingAddress,
    Controller0Address,
    Controller1Address,
    Gateway,
}

impl RequiredField {
    pub fn is_set(&self, spec: &AddressPoolSpec) -> bool {
        match self {
            RequiredField::FloatingAddress => spec.floating_address.is_some(),
            RequiredField::Controller0Address => spec.controller0_address.is_some(),
            RequiredField::Controller1Address => spec.controller1_address.is_some(),
            RequiredField::Gateway => spec.gateway.is_some(),
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequiredField::FloatingAddress => "floatingAddress",
            RequiredField::Controller0Address => "controller0Address",
            RequiredField::Controller1Address => "controller1Address",
            RequiredField::Gateway => "gateway",
        })
    }
}

use RequiredField::*;

const NONE: &[RequiredField] = &[];
const CONTROLLERS: &[RequiredField] = &[FloatingAddress, Controller0Address, Controller1Address];
const OAM_SIMPLEX: &[RequiredField] = &[FloatingAddress, Gateway];
const OAM_MULTINODE: &[RequiredField] = &[FloatingAddress, Gateway, Controller0Address, Controller1Address];

/// Rules for one network type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkPolicy {
    /// Fields required on a single all-in-one simplex system
    pub required_simplex: &'static [RequiredField],
    /// Fields required on every other topology
    pub required_multinode: &'static [RequiredField],
    /// Pools must be IPv4
    pub ipv4_only: bool,
    /// Neither creation nor change is allowed during bootstrap
    pub bootstrap_blocked: bool,
    /// Whether the gateway address is compared and pushed at all
    pub manages_gateway: bool,
}

impl NetworkPolicy {
    pub fn required_fields(&self, single_node_simplex: bool) -> &'static [RequiredField] {
        if single_node_simplex {
            self.required_simplex
        } else {
            self.required_multinode
        }
    }
}

const OAM: NetworkPolicy = NetworkPolicy {
    required_simplex: OAM_SIMPLEX,
    required_multinode: OAM_MULTINODE,
    ipv4_only: false,
    bootstrap_blocked: true,
    manages_gateway: true,
};

const MGMT: NetworkPolicy = NetworkPolicy {
    required_simplex: CONTROLLERS,
    required_multinode: CONTROLLERS,
    ipv4_only: false,
    bootstrap_blocked: true,
    manages_gateway: true,
};

const CLUSTER_HOST: NetworkPolicy = NetworkPolicy {
    required_simplex: CONTROLLERS,
    required_multinode: CONTROLLERS,
    ipv4_only: false,
    bootstrap_blocked: false,
    manages_gateway: true,
};

const PXEBOOT: NetworkPolicy = NetworkPolicy {
    required_simplex: CONTROLLERS,
    required_multinode: CONTROLLERS,
    ipv4_only: true,
    bootstrap_blocked: false,
    manages_gateway: true,
};

// No validation rule exists for admin pools; they always pass.
const ADMIN: NetworkPolicy = NetworkPolicy {
    required_simplex: NONE,
    required_multinode: NONE,
    ipv4_only: false,
    bootstrap_blocked: true,
    manages_gateway: true,
};

// Removing a gateway from an "other" pool leaves the system inconsistent,
// so the gateway is never touched for this type.
const OTHER: NetworkPolicy = NetworkPolicy {
    required_simplex: NONE,
    required_multinode: NONE,
    ipv4_only: false,
    bootstrap_blocked: false,
    manages_gateway: false,
};

/// Policy for a network type
pub fn policy_for(network_type: NetworkType) -> &'static NetworkPolicy {
    match network_type {
        NetworkType::Oam => &OAM,
        NetworkType::Mgmt => &MGMT,
        NetworkType::ClusterHost => &CLUSTER_HOST,
        NetworkType::Pxeboot => &PXEBOOT,
        NetworkType::Admin => &ADMIN,
        NetworkType::Other => &OTHER,
    }
}

/// IP family of an address or subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Family of `address`, which may carry a `/prefix` suffix. `None` when it
    /// does not parse.
    pub fn of(address: &str) -> Option<IpFamily> {
        parse_ip(address).map(|ip| match ip {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        })
    }
}

fn parse_ip(address: &str) -> Option<IpAddr> {
    let host = address.split('/').next().unwrap_or(address).trim();
    host.parse().ok()
}

/// Address equality that tolerates different spellings of the same address
/// (`fd00::1` vs `FD00:0::1`). Falls back to string equality when either side
/// does not parse.
pub fn same_address(a: &str, b: &str) -> bool {
    match (parse_ip(a), parse_ip(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}
