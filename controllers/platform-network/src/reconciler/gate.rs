//! Reconciliation gate.
//!
//! Decides whether a computed change may be applied to the system. During
//! bootstrap only first-time configuration of the types not reserved for the
//! initial configuration path is allowed; everything else is reconfiguration
//! and is refused. Day-2 changes are never applied here.

use super::policy::policy_for;
use crds::{DeploymentScope, NetworkType};

/// What the gate is asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTarget {
    /// The network itself; `remote_id_known` once it exists on the system
    Network { remote_id_known: bool },
    /// One of its pools; `family_associated` when the network already has a
    /// pool of the same IP family associated
    AddressPool { family_associated: bool },
}

pub fn should_reconcile(scope: DeploymentScope, network_type: NetworkType, target: GateTarget) -> bool {
    match scope {
        DeploymentScope::Day2 => false,
        DeploymentScope::Bootstrap => {
            if policy_for(network_type).bootstrap_blocked {
                return false;
            }
            match target {
                GateTarget::Network { remote_id_known } => !remote_id_known,
                GateTarget::AddressPool { family_associated } => !family_associated,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRESH_NETWORK: GateTarget = GateTarget::Network { remote_id_known: false };
    const FRESH_POOL: GateTarget = GateTarget::AddressPool { family_associated: false };

    #[test]
    fn test_reserved_types_blocked_in_bootstrap() {
        for network_type in [NetworkType::Oam, NetworkType::Mgmt, NetworkType::Admin] {
            assert!(!should_reconcile(DeploymentScope::Bootstrap, network_type, FRESH_NETWORK));
            assert!(!should_reconcile(DeploymentScope::Bootstrap, network_type, FRESH_POOL));
        }
    }

    #[test]
    fn test_first_creation_allowed_in_bootstrap() {
        for network_type in [NetworkType::ClusterHost, NetworkType::Pxeboot, NetworkType::Other] {
            assert!(should_reconcile(DeploymentScope::Bootstrap, network_type, FRESH_NETWORK));
            assert!(should_reconcile(DeploymentScope::Bootstrap, network_type, FRESH_POOL));
        }
    }

    #[test]
    fn test_reconfiguration_blocked_in_bootstrap() {
        assert!(!should_reconcile(
            DeploymentScope::Bootstrap,
            NetworkType::ClusterHost,
            GateTarget::Network { remote_id_known: true }
        ));
        assert!(!should_reconcile(
            DeploymentScope::Bootstrap,
            NetworkType::ClusterHost,
            GateTarget::AddressPool { family_associated: true }
        ));
    }

    #[test]
    fn test_day2_never_allowed() {
        assert!(!should_reconcile(DeploymentScope::Day2, NetworkType::ClusterHost, FRESH_NETWORK));
        assert!(!should_reconcile(DeploymentScope::Day2, NetworkType::Other, FRESH_POOL));
    }
}
