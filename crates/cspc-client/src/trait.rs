//! Transport trait for mocking
//!
//! The facade talks to the appliance only through this trait. The concrete
//! [`crate::HttpClient`] implements it, and tests can use mock implementations.

use crate::error::CspcError;

/// The three appliance endpoints
///
/// Each call is a single request. Implementations must not retry.
#[async_trait::async_trait]
pub trait CspcTransport: Send + Sync {
    /// `GET /cspc/info`, body returned whatever the status
    async fn get_info(&self) -> Result<String, CspcError>;

    /// `POST /cspc/xml`, body returned only on 200
    async fn post_xml(&self, payload: &str) -> Result<String, CspcError>;

    /// `POST /cspc/seedfile` as a two-part multipart upload
    async fn post_seed_file(&self, csv: &str, device_group: &str) -> Result<String, CspcError>;
}
