//! Platform network CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the platform network controller.

pub mod address_pool;
pub mod platform_network;

pub use address_pool::*;
pub use platform_network::*;

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;

    #[test]
    fn test_crd_names() {
        assert_eq!(PlatformNetwork::crd_name(), "platformnetworks.starlingx.windriver.com");
        assert_eq!(AddressPool::crd_name(), "addresspools.starlingx.windriver.com");
    }

    #[test]
    fn test_crds_have_status_subresource() {
        for crd in [PlatformNetwork::crd(), AddressPool::crd()] {
            let version = &crd.spec.versions[0];
            assert_eq!(version.name, "v1");
            assert!(version.subresources.as_ref().and_then(|s| s.status.as_ref()).is_some());
            assert_eq!(crd.spec.scope, "Namespaced");
        }
    }
}
