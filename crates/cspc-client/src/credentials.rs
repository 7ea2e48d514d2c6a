//! Credential context for the CSPC API
//!
//! Holds the appliance address and API user, and derives the Basic
//! authentication header sent with every request.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

const REDACTED: &str = "***";

/// Appliance address and API credentials
///
/// Immutable after construction. Two contexts built from the same four
/// fields compare equal.
///
/// `Display` and `Debug` mask the password. Use [`CredentialContext::unredacted`]
/// when the plaintext form is really needed.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialContext {
    host: String,
    username: String,
    password: String,
    verify_tls: bool,
    authorization: String,
}

impl CredentialContext {
    /// Create a new credential context
    ///
    /// # Arguments
    /// * `host` - IP or hostname of the appliance, without scheme or port
    /// * `username` - API user
    /// * `password` - API password
    /// * `verify_tls` - Whether to check the appliance certificate
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        verify_tls: bool,
    ) -> Self {
        let username = username.into();
        let password = password.into();
        let encoded = STANDARD.encode(format!("{}:{}", username, password));

        Self {
            host: host.into(),
            username,
            password,
            verify_tls,
            authorization: format!("Basic {}", encoded),
        }
    }

    /// Appliance host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// API user
    pub fn username(&self) -> &str {
        &self.username
    }

    /// API password
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Whether the appliance certificate is verified
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// Value of the `Authorization` header
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// Plaintext canonical form, password included
    ///
    /// Renders as `CredentialContext("host", "user", "password", true)`.
    /// Never log this.
    pub fn unredacted(&self) -> Unredacted<'_> {
        Unredacted(self)
    }

    fn write_canonical(&self, f: &mut fmt::Formatter<'_>, password: &str) -> fmt::Result {
        write!(
            f,
            "CredentialContext(\"{}\", \"{}\", \"{}\", {})",
            self.host, self.username, password, self.verify_tls
        )
    }
}

impl fmt::Display for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_canonical(f, REDACTED)
    }
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &REDACTED)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

/// Display wrapper returned by [`CredentialContext::unredacted`]
#[derive(Debug, Clone, Copy)]
pub struct Unredacted<'a>(&'a CredentialContext);

impl fmt::Display for Unredacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_canonical(f, &self.0.password)
    }
}
