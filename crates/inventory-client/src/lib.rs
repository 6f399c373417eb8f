//! System Inventory REST API Client
//!
//! A Rust client library for the platform inventory API, covering the
//! records a platform network controller converges: networks, address pools
//! and the associations between them.
//!
//! # Example
//!
//! ```no_run
//! use inventory_client::{InventoryClient, InventoryClientTrait, NetworkOpts};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = InventoryClient::new(
//!     "http://sysinv-api.platform:6385".to_string(),
//!     "your-api-token".to_string(),
//! )?;
//!
//! let networks = client.list_networks().await?;
//! if !networks.iter().any(|n| n.name == "cluster-host") {
//!     let opts = NetworkOpts {
//!         name: Some("cluster-host".to_string()),
//!         network_type: Some("cluster-host".to_string()),
//!         dynamic: Some(false),
//!     };
//!     client.create_network(&opts).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod inventory_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::InventoryClient;
pub use common::HttpClient;
pub use error::InventoryError;
pub use models::*;
pub use inventory_trait::InventoryClientTrait;
#[cfg(feature = "test-util")]
pub use mock::{MockCall, MockInventoryClient};
