//! HTTP transport for the CSPC API
//!
//! Three fixed endpoints on the appliance:
//! - `GET /cspc/info` - diagnostic information
//! - `POST /cspc/xml` - XML request/response API
//! - `POST /cspc/seedfile` - multipart seed-file import

pub mod seed_request;

use crate::config::{ClientOptions, SeedFileTls};
use crate::credentials::CredentialContext;
use crate::cspc_trait::CspcTransport;
use crate::error::CspcError;
use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};
use xmltree::{Element, EmitterConfig, XMLNode};

/// Path of the info endpoint
pub const INFO_PATH: &str = "/cspc/info";
/// Path of the XML API endpoint
pub const XML_PATH: &str = "/cspc/xml";
/// Path of the seed-file upload endpoint
pub const SEEDFILE_PATH: &str = "/cspc/seedfile";

/// Request tags whose text is masked in logs
const SECRET_TAGS: [&str; 4] = ["Password", "EnablePassword", "ReadCommunity", "WriteCommunity"];
const REDACTED: &str = "***";

/// HTTP client wrapper with authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    seed_client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    ///
    /// # Arguments
    /// * `credentials` - Appliance host and API user
    /// * `options` - Scheme, port and seed-file TLS policy
    pub fn new(credentials: &CredentialContext, options: &ClientOptions) -> Result<Self, CspcError> {
        let verify = credentials.verify_tls();
        let client = Client::builder()
            .danger_accept_invalid_certs(!verify)
            .build()?;

        let seed_verify = match options.seed_file_tls {
            SeedFileTls::FollowContext => verify,
            SeedFileTls::AlwaysSkip => false,
        };
        if verify && !seed_verify {
            warn!("Seed-file uploads to {} skip certificate verification", credentials.host());
        }
        let seed_client = Client::builder()
            .danger_accept_invalid_certs(!seed_verify)
            .build()?;

        let mut authorization = HeaderValue::from_str(credentials.authorization())
            .map_err(|e| CspcError::InvalidConfig(format!("unusable credentials: {}", e)))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        Ok(Self {
            client,
            seed_client,
            base_url: format!("{}://{}:{}", options.scheme, credentials.host(), options.port),
            headers,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Fail with [`CspcError::RemoteApi`] unless the appliance answered 200
    async fn expect_ok(path: &str, response: Response) -> Result<String, CspcError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        debug!("Response {} from {}:\n{}", status, path, body);

        if status != StatusCode::OK {
            warn!("{} failed: {}", path, status);
            return Err(CspcError::RemoteApi {
                status,
                headers,
                body,
            });
        }

        Ok(body)
    }
}

/// Request body as it may appear in logs
///
/// Text of credential tags is replaced by `***`. A body that does not parse
/// is reduced to its length.
pub fn redact_payload(payload: &str) -> String {
    let Ok(mut root) = Element::parse(payload.as_bytes()) else {
        return format!("<{} bytes, not shown>", payload.len());
    };
    mask_secrets(&mut root);

    let config = EmitterConfig::new()
        .perform_indent(true)
        .write_document_declaration(false);
    let mut output = Vec::new();
    match root.write_with_config(&mut output, config) {
        Ok(()) => String::from_utf8_lossy(&output).into_owned(),
        Err(_) => format!("<{} bytes, not shown>", payload.len()),
    }
}

fn mask_secrets(element: &mut Element) {
    if SECRET_TAGS.contains(&element.name.as_str()) {
        if !element.children.is_empty() {
            element.children = vec![XMLNode::Text(REDACTED.to_string())];
        }
        return;
    }
    for child in element.children.iter_mut() {
        if let XMLNode::Element(child) = child {
            mask_secrets(child);
        }
    }
}

#[async_trait::async_trait]
impl CspcTransport for HttpClient {
    async fn get_info(&self) -> Result<String, CspcError> {
        let url = self.build_url(INFO_PATH);
        debug!("GET {}", url);

        let response = self.client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;

        // Diagnostic endpoint: the status is reported, not enforced
        let status = response.status();
        let body = response.text().await?;
        debug!("Response {} from {}:\n{}", status, INFO_PATH, body);
        Ok(body)
    }

    async fn post_xml(&self, payload: &str) -> Result<String, CspcError> {
        let url = self.build_url(XML_PATH);
        debug!("POST {}\nRequest Body: {}", url, redact_payload(payload));

        let response = self.client
            .post(&url)
            .headers(self.headers.clone())
            .body(payload.to_string())
            .send()
            .await?;

        Self::expect_ok(XML_PATH, response).await
    }

    async fn post_seed_file(&self, csv: &str, device_group: &str) -> Result<String, CspcError> {
        let url = self.build_url(SEEDFILE_PATH);
        let file_name = seed_request::seed_file_name(device_group, chrono::Local::now());
        let request = seed_request::seed_file_request(device_group, &file_name)?;
        debug!(
            "POST {}\nSeed file: {} ({} bytes)\nRequest: {}",
            url,
            file_name,
            csv.len(),
            request
        );

        let form = Form::new()
            .part("request", Part::text(request))
            .part("file", Part::text(csv.to_string()).file_name(file_name));

        let response = self.seed_client
            .post(&url)
            .headers(self.headers.clone())
            .multipart(form)
            .send()
            .await?;

        Self::expect_ok(SEEDFILE_PATH, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scheme;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(buffer.clone())
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, buffer.contents())
    }

    #[test]
    fn test_redact_payload_masks_credential_text() {
        let payload = r#"<Request xmlns="http://www.parinetworks.com/api/schemas/1.1">
  <DeviceCredential identifier="lab">
    <Protocol>sshv2</Protocol>
    <UserName>admin</UserName>
    <Password>s3cret-pw</Password>
    <EnablePassword>en-pw</EnablePassword>
    <ReadCommunity>ro-comm</ReadCommunity>
    <WriteCommunity>rw-comm</WriteCommunity>
  </DeviceCredential>
</Request>"#;

        let redacted = redact_payload(payload);
        for secret in ["s3cret-pw", "en-pw", "ro-comm", "rw-comm"] {
            assert!(!redacted.contains(secret), "{} left in {}", secret, redacted);
        }
        assert!(redacted.contains("<UserName>admin</UserName>"));
        assert!(redacted.contains("<Password>***</Password>"));
        assert!(redacted.contains("identifier=\"lab\""));
    }

    #[test]
    fn test_redact_payload_hides_unparseable_body() {
        let redacted = redact_payload("<Password>oops");
        assert_eq!(redacted, "<14 bytes, not shown>");
    }

    #[test]
    fn test_redact_payload_keeps_ordinary_requests() {
        let redacted = redact_payload("<Request><IPAddress>10.0.0.1</IPAddress></Request>");
        assert!(redacted.contains("<IPAddress>10.0.0.1</IPAddress>"));
    }

    #[test]
    fn test_always_skip_warns_when_context_verifies() {
        let credentials = CredentialContext::new("10.1.1.1", "admin", "pw", true);
        let options = ClientOptions {
            seed_file_tls: SeedFileTls::AlwaysSkip,
            ..ClientOptions::default()
        };

        let (http, logs) = capture_logs(|| HttpClient::new(&credentials, &options));
        assert!(http.is_ok());
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("Seed-file uploads to 10.1.1.1 skip certificate verification"));
    }

    #[test]
    fn test_no_tls_warning_when_policies_agree() {
        for (verify, policy) in [
            (true, SeedFileTls::FollowContext),
            (false, SeedFileTls::FollowContext),
            (false, SeedFileTls::AlwaysSkip),
        ] {
            let credentials = CredentialContext::new("10.1.1.1", "admin", "pw", verify);
            let options = ClientOptions {
                seed_file_tls: policy,
                ..ClientOptions::default()
            };
            let (http, logs) = capture_logs(|| HttpClient::new(&credentials, &options));
            assert!(http.is_ok());
            assert!(!logs.contains("skip certificate verification"), "{}", logs);
        }
    }

    #[test]
    fn test_base_url_uses_fixed_port() {
        let credentials = CredentialContext::new("10.1.1.1", "admin", "pw", false);
        let http = HttpClient::new(&credentials, &ClientOptions::default()).unwrap();
        assert_eq!(http.base_url(), "https://10.1.1.1:8001");
        assert_eq!(http.build_url(XML_PATH), "https://10.1.1.1:8001/cspc/xml");
    }

    #[test]
    fn test_scheme_and_port_from_options() {
        let credentials = CredentialContext::new("localhost", "admin", "pw", true);
        let options = ClientOptions {
            scheme: Scheme::Http,
            port: 18001,
            ..ClientOptions::default()
        };
        let http = HttpClient::new(&credentials, &options).unwrap();
        assert_eq!(http.build_url(INFO_PATH), "http://localhost:18001/cspc/info");
    }

    #[test]
    fn test_default_headers() {
        let credentials = CredentialContext::new("10.1.1.1", "user", "pw", false);
        let http = HttpClient::new(&credentials, &ClientOptions::default()).unwrap();
        let headers = http.headers();
        assert_eq!(headers[ACCEPT], "application/xml");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(headers[AUTHORIZATION], "Basic dXNlcjpwdw==");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }
}
