//! Client configuration
//!
//! The library never reads the environment or files on its own; the
//! embedding application builds (or deserializes) a [`ClientOptions`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Namespace URI the appliance requires on every request document
pub const CSPC_NAMESPACE: &str = "http://www.parinetworks.com/api/schemas/1.1";

/// Port the appliance serves its API on
pub const DEFAULT_PORT: u16 = 8001;

/// URL scheme used to reach the appliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP (lab setups and tests)
    Http,
    /// HTTPS
    #[default]
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
        }
    }
}

/// TLS policy for the seed-file upload
///
/// Older tooling always skipped certificate checks on `/cspc/seedfile`
/// regardless of the caller's preference. `AlwaysSkip` reproduces that;
/// the default follows the credential context like every other call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedFileTls {
    /// Use the credential context's `verify_tls` flag
    #[default]
    FollowContext,
    /// Never verify the certificate on seed-file uploads
    AlwaysSkip,
}

/// XML namespace applied to outgoing request documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlNamespace {
    /// Namespace URI
    pub uri: String,
    /// Prefix to bind the URI to; `None` declares it as the default namespace
    #[serde(default)]
    pub prefix: Option<String>,
}

impl Default for XmlNamespace {
    fn default() -> Self {
        Self {
            uri: CSPC_NAMESPACE.to_string(),
            prefix: None,
        }
    }
}

/// Options for building a [`crate::CspcClient`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// URL scheme
    pub scheme: Scheme,
    /// API port
    pub port: u16,
    /// Directory holding the XML request templates
    pub template_dir: PathBuf,
    /// Namespace for request documents
    pub namespace: XmlNamespace,
    /// TLS policy for seed-file uploads
    pub seed_file_tls: SeedFileTls,
}

impl ClientOptions {
    /// Templates bundled with this crate
    pub fn bundled_template_dir() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            port: DEFAULT_PORT,
            template_dir: Self::bundled_template_dir(),
            namespace: XmlNamespace::default(),
            seed_file_tls: SeedFileTls::default(),
        }
    }
}
