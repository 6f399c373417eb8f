//! Controller-specific error types.
//!
//! This module defines error types specific to the PlatformNetwork controller
//! that are not covered by upstream library errors.

use inventory_client::InventoryError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the PlatformNetwork controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Inventory API error
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// PlatformNetwork resource not found in the control plane
    #[error("PlatformNetwork not found: {0}")]
    NetworkNotFound(String),

    /// AddressPool resource not found in the control plane
    #[error("AddressPool not found: {0}")]
    AddressPoolNotFound(String),

    /// Spec and system differ but the change is not allowed in the current phase
    #[error("There is delta between applied spec and system for {kind} '{name}'")]
    Drift { kind: &'static str, name: String },

    /// Writing a status sub-resource failed
    #[error("failed to update '{name}' {kind} status: {source}")]
    StatusUpdate {
        kind: &'static str,
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// One or more pairs failed during a reconciliation pass
    #[error("{} error(s) during reconciliation: {}", .0.len(), join(.0))]
    Batch(Vec<ControllerError>),
}

fn join(errors: &[ControllerError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl ControllerError {
    /// True for failures talking to either API, as opposed to policy outcomes
    pub fn is_transport(&self) -> bool {
        match self {
            ControllerError::Kube(_)
            | ControllerError::Inventory(_)
            | ControllerError::StatusUpdate { .. } => true,
            ControllerError::Batch(errors) => errors.iter().any(ControllerError::is_transport),
            _ => false,
        }
    }

    /// Fold a pass's errors into one, or `Ok` when there were none
    pub fn from_batch(mut errors: Vec<ControllerError>) -> Result<(), ControllerError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ControllerError::Batch(errors)),
        }
    }
}
