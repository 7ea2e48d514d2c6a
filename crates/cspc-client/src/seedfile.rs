//! Seed-file rows for bulk device import
//!
//! The appliance imports a 36-column CSV, one device per line. Columns
//! that are not set are written as empty fields in their fixed position.

use serde::{Deserialize, Serialize};

/// Number of columns in a seed-file line
pub const SEED_COLUMNS: usize = 36;

/// One line of a seed file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedRow {
    /// IP address, or domain name resolving to one
    pub ip_address: String,
    pub host_name: String,
    pub domain_name: String,
    pub device_identity: String,
    pub display_name: String,
    pub sys_object_id: String,
    pub dcr_device_type: String,
    pub mdf_type: String,
    pub snmp_ro: String,
    pub snmp_rw: String,
    pub snmpv3_user_name: String,
    pub snmpv3_auth_password: String,
    pub snmpv3_engine_id: String,
    pub snmpv3_auth_algorithm: String,
    pub rx_boot_mode_user: String,
    pub rx_boot_mode_password: String,
    /// Primary (or TACACS) user
    pub primary_user: String,
    /// Primary (or TACACS) password
    pub primary_password: String,
    pub primary_enable_password: String,
    pub http_user: String,
    pub http_password: String,
    pub http_mode: String,
    pub http_port: String,
    pub https_port: String,
    pub cert_common_name: String,
    pub secondary_user: String,
    pub secondary_password: String,
    pub secondary_enable_password: String,
    pub secondary_http_user: String,
    pub secondary_http_password: String,
    pub snmpv3_priv_algorithm: String,
    pub snmpv3_priv_password: String,
    pub user_field_1: String,
    pub user_field_2: String,
    pub user_field_3: String,
    pub user_field_4: String,
}

impl SeedRow {
    /// Row with only the address column set
    pub fn new(ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            ..Self::default()
        }
    }

    /// Column values in file order
    pub fn columns(&self) -> [&str; SEED_COLUMNS] {
        [
            &self.ip_address,
            &self.host_name,
            &self.domain_name,
            &self.device_identity,
            &self.display_name,
            &self.sys_object_id,
            &self.dcr_device_type,
            &self.mdf_type,
            &self.snmp_ro,
            &self.snmp_rw,
            &self.snmpv3_user_name,
            &self.snmpv3_auth_password,
            &self.snmpv3_engine_id,
            &self.snmpv3_auth_algorithm,
            &self.rx_boot_mode_user,
            &self.rx_boot_mode_password,
            &self.primary_user,
            &self.primary_password,
            &self.primary_enable_password,
            &self.http_user,
            &self.http_password,
            &self.http_mode,
            &self.http_port,
            &self.https_port,
            &self.cert_common_name,
            &self.secondary_user,
            &self.secondary_password,
            &self.secondary_enable_password,
            &self.secondary_http_user,
            &self.secondary_http_password,
            &self.snmpv3_priv_algorithm,
            &self.snmpv3_priv_password,
            &self.user_field_1,
            &self.user_field_2,
            &self.user_field_3,
            &self.user_field_4,
        ]
    }

    /// Comma-separated line including the trailing newline
    ///
    /// Values are written verbatim; the import format has no quoting.
    pub fn to_csv_line(&self) -> String {
        let mut line = self.columns().join(",");
        line.push('\n');
        line
    }
}

/// Seed-file line for a device with the commonly used columns
pub fn format_csv_device_row(
    ip_address: &str,
    host_name: &str,
    username: &str,
    password: &str,
    enable_password: &str,
    snmp_ro: &str,
    snmp_rw: &str,
) -> String {
    SeedRow {
        ip_address: ip_address.to_string(),
        host_name: host_name.to_string(),
        snmp_ro: snmp_ro.to_string(),
        snmp_rw: snmp_rw.to_string(),
        primary_user: username.to_string(),
        primary_password: password.to_string(),
        primary_enable_password: enable_password.to_string(),
        ..SeedRow::default()
    }
    .to_csv_line()
}

/// Concatenate rows into a seed-file body
pub fn seed_file_body(rows: &[SeedRow]) -> String {
    rows.iter().map(SeedRow::to_csv_line).collect()
}
