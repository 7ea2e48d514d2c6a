//! CSPC API Client
//!
//! A Rust client library for the HTTP/XML control API of a CSPC collector
//! appliance. Builds XML requests from on-disk templates, submits them and
//! filters the device inventory.
//!
//! # Example
//!
//! ```no_run
//! use cspc_client::{CredentialContext, CspcClient, DeviceField, ResponseFormat};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client
//! let credentials = CredentialContext::new("10.0.0.10", "admin", "secret", false);
//! let client = CspcClient::new(&credentials)?;
//!
//! // Devices whose host name contains "switch"
//! let switches = client.find_devices_by(DeviceField::HostName, "switch").await?;
//!
//! // Remove everything the appliance can no longer reach
//! let unreachable = client.list_unreachable_devices().await?;
//! client.delete_devices(&unreachable, ResponseFormat::Xml).await?;
//!
//! // Discover a few addresses
//! client.discover_devices(&["192.168.1.1", "192.168.1.2"], ResponseFormat::Xml).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Inventory**: List devices, filter by field, find unreachable devices
//! - **Management**: Add and delete devices, add SNMPv2c and SSHv2 credentials
//! - **Discovery**: Start discovery jobs for IP lists
//! - **Seed files**: Build and upload bulk-import CSV files

pub mod client;
pub mod common;
pub mod config;
pub mod credentials;
pub mod decode;
pub mod error;
pub mod models;
pub mod seedfile;
pub mod template;
#[path = "trait.rs"]
pub mod cspc_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::CspcClient;
pub use common::HttpClient;
pub use config::{ClientOptions, Scheme, SeedFileTls, XmlNamespace};
pub use credentials::CredentialContext;
pub use cspc_trait::CspcTransport;
pub use decode::{decode_many, decode_one};
pub use error::CspcError;
pub use models::*;
pub use seedfile::{SeedRow, format_csv_device_row};
pub use template::{RequestTemplate, TemplateEngine};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockCspcTransport;
