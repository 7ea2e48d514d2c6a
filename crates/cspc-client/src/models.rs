//! CSPC API models
//!
//! Device records, credential bundles and the request/response shapes used
//! by [`crate::CspcClient`]. Tag names match the appliance's XML schema.

use crate::error::CspcError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One device as reported by the appliance: tag name to text, in document order
///
/// Only the tags present in the response appear; there are no null entries.
pub type DeviceRecord = IndexMap<String, String>;

/// Known device detail fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceField {
    Id,
    #[default]
    HostName,
    IPAddress,
    Status,
    DeviceFamily,
    ProductFamily,
    Model,
    SerialNumber,
    Vendor,
    OS,
    Version,
    Image,
    DiscTime,
    InvTime,
    SysObjectId,
    SysLocation,
    SysDescription,
    DomainName,
    DeviceSource,
    PrimaryDeviceName,
    SysName,
}

impl DeviceField {
    /// Every known field, in the appliance's response order
    pub const ALL: [DeviceField; 21] = [
        DeviceField::Id,
        DeviceField::HostName,
        DeviceField::IPAddress,
        DeviceField::Status,
        DeviceField::DeviceFamily,
        DeviceField::ProductFamily,
        DeviceField::Model,
        DeviceField::SerialNumber,
        DeviceField::Vendor,
        DeviceField::OS,
        DeviceField::Version,
        DeviceField::Image,
        DeviceField::DiscTime,
        DeviceField::InvTime,
        DeviceField::SysObjectId,
        DeviceField::SysLocation,
        DeviceField::SysDescription,
        DeviceField::DomainName,
        DeviceField::DeviceSource,
        DeviceField::PrimaryDeviceName,
        DeviceField::SysName,
    ];

    /// XML tag name
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceField::Id => "Id",
            DeviceField::HostName => "HostName",
            DeviceField::IPAddress => "IPAddress",
            DeviceField::Status => "Status",
            DeviceField::DeviceFamily => "DeviceFamily",
            DeviceField::ProductFamily => "ProductFamily",
            DeviceField::Model => "Model",
            DeviceField::SerialNumber => "SerialNumber",
            DeviceField::Vendor => "Vendor",
            DeviceField::OS => "OS",
            DeviceField::Version => "Version",
            DeviceField::Image => "Image",
            DeviceField::DiscTime => "DiscTime",
            DeviceField::InvTime => "InvTime",
            DeviceField::SysObjectId => "SysObjectId",
            DeviceField::SysLocation => "SysLocation",
            DeviceField::SysDescription => "SysDescription",
            DeviceField::DomainName => "DomainName",
            DeviceField::DeviceSource => "DeviceSource",
            DeviceField::PrimaryDeviceName => "PrimaryDeviceName",
            DeviceField::SysName => "SysName",
        }
    }
}

impl fmt::Display for DeviceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceField {
    type Err = CspcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| CspcError::UnknownField(s.to_string()))
    }
}

/// Substring pattern(s) for [`crate::CspcClient::find_devices_by`]
///
/// Matching is case-sensitive and checks whether a candidate is contained
/// in the field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchValue {
    /// A single candidate
    One(String),
    /// Match if any candidate is contained
    AnyOf(BTreeSet<String>),
}

impl MatchValue {
    /// Whether `field_value` contains the candidate (or any candidate)
    pub fn matches(&self, field_value: &str) -> bool {
        match self {
            MatchValue::One(candidate) => field_value.contains(candidate.as_str()),
            MatchValue::AnyOf(candidates) => candidates
                .iter()
                .any(|candidate| field_value.contains(candidate.as_str())),
        }
    }
}

impl From<&str> for MatchValue {
    fn from(value: &str) -> Self {
        MatchValue::One(value.to_string())
    }
}

impl From<String> for MatchValue {
    fn from(value: String) -> Self {
        MatchValue::One(value)
    }
}

impl From<BTreeSet<String>> for MatchValue {
    fn from(values: BTreeSet<String>) -> Self {
        MatchValue::AnyOf(values)
    }
}

impl<const N: usize> From<[&str; N]> for MatchValue {
    fn from(values: [&str; N]) -> Self {
        MatchValue::AnyOf(values.into_iter().map(str::to_string).collect())
    }
}

/// Summary of a device that is not reachable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreachableDevice {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "HostName")]
    pub host_name: String,
    #[serde(rename = "IPAddress")]
    pub ip_address: String,
    #[serde(rename = "Status")]
    pub status: String,
}

/// Anything that identifies a device for deletion
pub trait DeviceRef {
    /// Appliance device id, if known
    fn device_id(&self) -> Option<&str>;
}

impl DeviceRef for DeviceRecord {
    fn device_id(&self) -> Option<&str> {
        self.get(DeviceField::Id.as_str()).map(String::as_str)
    }
}

impl DeviceRef for UnreachableDevice {
    fn device_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl DeviceRef for str {
    fn device_id(&self) -> Option<&str> {
        Some(self)
    }
}

impl DeviceRef for &str {
    fn device_id(&self) -> Option<&str> {
        Some(self)
    }
}

impl DeviceRef for String {
    fn device_id(&self) -> Option<&str> {
        Some(self)
    }
}

/// Credential protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialProtocol {
    Snmpv2c,
    Sshv2,
}

impl CredentialProtocol {
    /// Value of the `<Protocol>` tag
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialProtocol::Snmpv2c => "snmpv2c",
            CredentialProtocol::Sshv2 => "sshv2",
        }
    }
}

/// SNMPv2c community strings bound to an IP expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpV2cCredential {
    /// Glob-style address pattern, e.g. `*.*.*.*`
    pub ip_expression: String,
    pub read_community: String,
    pub write_community: String,
}

/// SSHv2 login bound to an IP expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshCredential {
    /// Glob-style address pattern, e.g. `10.1.*.*`
    pub ip_expression: String,
    pub user: String,
    pub password: String,
    pub enable_password: String,
}

/// Protocol-specific part of a device credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSecret {
    /// Community strings
    Snmpv2c {
        read_community: String,
        write_community: String,
    },
    /// Username/password pair
    Sshv2 {
        user: String,
        password: String,
        enable_password: String,
    },
}

/// A named credential bundle bound to an IP expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCredential {
    /// Name of the bundle on the appliance
    pub identifier: String,
    /// Glob-style address pattern
    pub ip_expression: String,
    pub secret: CredentialSecret,
}

impl DeviceCredential {
    /// Protocol implied by the secret
    pub fn protocol(&self) -> CredentialProtocol {
        match self.secret {
            CredentialSecret::Snmpv2c { .. } => CredentialProtocol::Snmpv2c,
            CredentialSecret::Sshv2 { .. } => CredentialProtocol::Sshv2,
        }
    }

    /// SNMPv2c bundle named `identifier`
    pub fn snmpv2c(identifier: impl Into<String>, credential: &SnmpV2cCredential) -> Self {
        Self {
            identifier: identifier.into(),
            ip_expression: credential.ip_expression.clone(),
            secret: CredentialSecret::Snmpv2c {
                read_community: credential.read_community.clone(),
                write_community: credential.write_community.clone(),
            },
        }
    }

    /// SSHv2 bundle named `identifier`
    pub fn sshv2(identifier: impl Into<String>, credential: &SshCredential) -> Self {
        Self {
            identifier: identifier.into(),
            ip_expression: credential.ip_expression.clone(),
            secret: CredentialSecret::Sshv2 {
                user: credential.user.clone(),
                password: credential.password.clone(),
                enable_password: credential.enable_password.clone(),
            },
        }
    }
}

/// How a submit operation returns the appliance's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Raw XML body
    #[default]
    Xml,
    /// Decoded into nested maps
    Structured,
}

/// Answer to a submit operation
#[derive(Debug, Clone, PartialEq)]
pub enum ApplianceResponse {
    /// Raw XML body
    Xml(String),
    /// Decoded body
    Structured(serde_json::Value),
}

/// Result of [`crate::CspcClient::list_devices`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceListing {
    /// `Device` elements as parsed
    Elements(Vec<xmltree::Element>),
    /// `Device` elements decoded, one `{"Device": {...}}` map each
    Structured(Vec<serde_json::Value>),
}

impl DeviceListing {
    /// Number of devices
    pub fn len(&self) -> usize {
        match self {
            DeviceListing::Elements(elements) => elements.len(),
            DeviceListing::Structured(values) => values.len(),
        }
    }

    /// Whether no device was returned
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
