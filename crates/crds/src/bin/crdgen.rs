//! Prints the CRD manifests for every resource in this crate as a YAML stream.
//!
//! Usage: `cargo run -p crds --bin crdgen > deploy/crds.yaml`

use crds::{AddressPool, PlatformNetwork};
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crds = [PlatformNetwork::crd(), AddressPool::crd()];
    for crd in crds {
        print!("---\n{}", serde_yaml::to_string(&crd)?);
    }
    Ok(())
}
