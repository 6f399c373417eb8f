//! Identity resolution of desired resources against remote records.
//!
//! A stored identifier is preferred; when it is missing or stale the record is
//! looked up by exact name instead.

use inventory_client::{AddressPool as RemoteAddressPool, Network as RemoteNetwork};

/// A remote record with an opaque identifier and a display name
pub trait RemoteRecord {
    fn remote_id(&self) -> &str;
    fn remote_name(&self) -> &str;
}

impl RemoteRecord for RemoteNetwork {
    fn remote_id(&self) -> &str {
        &self.uuid
    }

    fn remote_name(&self) -> &str {
        &self.name
    }
}

impl RemoteRecord for RemoteAddressPool {
    fn remote_id(&self) -> &str {
        &self.uuid
    }

    fn remote_name(&self) -> &str {
        &self.name
    }
}

/// Find the remote record for a desired resource in `snapshot`
pub fn resolve<'a, T: RemoteRecord>(stored_id: Option<&str>, name: &str, snapshot: &'a [T]) -> Option<&'a T> {
    stored_id
        .and_then(|id| snapshot.iter().find(|r| r.remote_id() == id))
        .or_else(|| snapshot.iter().find(|r| r.remote_name() == name))
}
