//! CSPC API client
//!
//! Public operations over the appliance: list and filter devices, add and
//! delete devices, add credentials, trigger discovery and import seed files.
//! Every submit is a single `POST /cspc/xml` built from a request template;
//! the appliance accepts or rejects the whole batch.

use crate::common::HttpClient;
use crate::config::ClientOptions;
use crate::credentials::CredentialContext;
use crate::cspc_trait::CspcTransport;
use crate::decode;
use crate::error::CspcError;
use crate::models::*;
use crate::seedfile::{SeedRow, seed_file_body};
use crate::template::{RequestTemplate, Template, TemplateEngine, append_element, set_attribute};
use indexmap::IndexMap;
use tracing::{debug, info};
use xmltree::{Element, XMLNode};

/// Client for the CSPC XML API
#[derive(Debug, Clone)]
pub struct CspcClient<T: CspcTransport = HttpClient> {
    transport: T,
    templates: TemplateEngine,
}

impl CspcClient<HttpClient> {
    /// Create a client with default options (HTTPS on port 8001, bundled templates)
    pub fn new(credentials: &CredentialContext) -> Result<Self, CspcError> {
        Self::with_options(credentials, &ClientOptions::default())
    }

    /// Create a client with explicit options
    pub fn with_options(
        credentials: &CredentialContext,
        options: &ClientOptions,
    ) -> Result<Self, CspcError> {
        let transport = HttpClient::new(credentials, options)?;
        Ok(Self::from_parts(transport, TemplateEngine::from_options(options)))
    }
}

impl<T: CspcTransport> CspcClient<T> {
    /// Assemble a client from a transport and a template engine
    pub fn from_parts(transport: T, templates: TemplateEngine) -> Self {
        Self { transport, templates }
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Template engine used to build request bodies
    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    /// Body of `GET /cspc/info`
    pub async fn get_info(&self) -> Result<String, CspcError> {
        self.transport.get_info().await
    }

    /// All devices known to the appliance
    ///
    /// # Returns
    /// * `DeviceListing::Elements` - `Device` elements as parsed, for `ResponseFormat::Xml`
    /// * `DeviceListing::Structured` - one `{"Device": {...}}` value per device
    pub async fn list_devices(&self, format: ResponseFormat) -> Result<DeviceListing, CspcError> {
        let devices = self.device_elements().await?;
        Ok(match format {
            ResponseFormat::Xml => DeviceListing::Elements(devices),
            ResponseFormat::Structured => DeviceListing::Structured(decode::decode_many(&devices)),
        })
    }

    /// Devices whose `Status` is not `reachable` (case-insensitive)
    ///
    /// A device without a `Status` tag counts as not reachable.
    pub async fn list_unreachable_devices(&self) -> Result<Vec<UnreachableDevice>, CspcError> {
        let devices = self.device_elements().await?;

        let unreachable: Vec<UnreachableDevice> = devices
            .iter()
            .filter(|device| {
                child_text(device, DeviceField::Status.as_str())
                    .is_none_or(|status| !status.eq_ignore_ascii_case("reachable"))
            })
            .map(|device| {
                let field = |f: DeviceField| child_text(device, f.as_str()).unwrap_or_default();
                UnreachableDevice {
                    id: field(DeviceField::Id),
                    host_name: field(DeviceField::HostName),
                    ip_address: field(DeviceField::IPAddress),
                    status: field(DeviceField::Status),
                }
            })
            .collect();

        info!("num unreachable devices: {}", unreachable.len());
        Ok(unreachable)
    }

    /// Devices whose `field` contains `value` (or any of a set of values)
    ///
    /// Matching is a case-sensitive substring test. Devices without `field`
    /// never match. Matched devices are returned with all their fields.
    ///
    /// # Example
    /// ```no_run
    /// # use cspc_client::{CspcClient, CredentialContext, DeviceField};
    /// # async fn example() -> Result<(), cspc_client::CspcError> {
    /// # let client = CspcClient::new(&CredentialContext::new("10.0.0.10", "admin", "pw", false))?;
    /// // all devices having 1.2.3. in their IP address
    /// let devices = client.find_devices_by(DeviceField::IPAddress, "1.2.3.").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_devices_by(
        &self,
        field: DeviceField,
        value: impl Into<MatchValue>,
    ) -> Result<Vec<DeviceRecord>, CspcError> {
        let value = value.into();
        let devices = self.device_elements().await?;

        let matched: Vec<DeviceRecord> = devices
            .iter()
            .filter(|device| {
                child_text(device, field.as_str()).is_some_and(|text| value.matches(&text))
            })
            .map(device_record)
            .collect();

        debug!("{} devices matched {} {:?}", matched.len(), field, value);
        Ok(matched)
    }

    /// Add credential bundles of any protocol in one request
    pub async fn add_credentials(
        &self,
        credentials: &[DeviceCredential],
        format: ResponseFormat,
    ) -> Result<ApplianceResponse, CspcError> {
        let mut template = self.templates.load_request(RequestTemplate::AddCredentials)?;
        let list = self.templates.find_container(&mut template, "DeviceCredentialList")?;

        for credential in credentials {
            let element = self.credential_element(credential);
            append_element(list, element);
        }

        self.submit(&template, format).await
    }

    /// Add SNMPv2c credentials, keyed by credential name
    pub async fn add_credentials_snmpv2c(
        &self,
        credentials: &IndexMap<String, SnmpV2cCredential>,
        format: ResponseFormat,
    ) -> Result<ApplianceResponse, CspcError> {
        let bundles: Vec<DeviceCredential> = credentials
            .iter()
            .map(|(name, credential)| DeviceCredential::snmpv2c(name.as_str(), credential))
            .collect();
        self.add_credentials(&bundles, format).await
    }

    /// Add SSHv2 credentials, keyed by credential name
    pub async fn add_credentials_ssh(
        &self,
        credentials: &IndexMap<String, SshCredential>,
        format: ResponseFormat,
    ) -> Result<ApplianceResponse, CspcError> {
        let bundles: Vec<DeviceCredential> = credentials
            .iter()
            .map(|(name, credential)| DeviceCredential::sshv2(name.as_str(), credential))
            .collect();
        self.add_credentials(&bundles, format).await
    }

    /// Add devices, one `Device` element per record
    ///
    /// Field names are sent verbatim. The appliance expects at least
    /// `IPAddress`; note that it uses `PrimaryDeviceName` as the host name
    /// seen by other tools and defaults it to the IP address.
    pub async fn add_devices(
        &self,
        devices: &[DeviceRecord],
        format: ResponseFormat,
    ) -> Result<ApplianceResponse, CspcError> {
        let mut template = self.templates.load_request(RequestTemplate::AddDevices)?;
        let list = self.templates.find_container(&mut template, "DeviceList")?;

        for device in devices {
            let mut element = self.templates.element("Device");
            for (tag, value) in device {
                self.templates.append_child(&mut element, tag, value);
            }
            append_element(list, element);
        }

        self.submit(&template, format).await
    }

    /// Delete devices by appliance id
    ///
    /// Accepts records from [`Self::find_devices_by`], [`Self::list_unreachable_devices`]
    /// or plain ids. Fails before sending anything if a record has no `Id`.
    pub async fn delete_devices<D: DeviceRef>(
        &self,
        devices: &[D],
        format: ResponseFormat,
    ) -> Result<ApplianceResponse, CspcError> {
        let ids = devices
            .iter()
            .enumerate()
            .map(|(index, device)| {
                device.device_id().ok_or_else(|| {
                    CspcError::InvalidRequest(format!("device #{} has no Id", index))
                })
            })
            .collect::<Result<Vec<&str>, CspcError>>()?;

        let mut template = self.templates.load_request(RequestTemplate::DeleteDevices)?;
        let list = self.templates.find_container(&mut template, "DeviceList")?;

        for id in ids {
            let mut element = self.templates.element("Device");
            self.templates.append_child(&mut element, DeviceField::Id.as_str(), id);
            append_element(list, element);
        }

        self.submit(&template, format).await
    }

    /// Start a discovery job for a list of IP addresses
    ///
    /// The job identifier is the current Unix time in seconds. Two calls in
    /// the same second share an identifier.
    pub async fn discover_devices<S: AsRef<str>>(
        &self,
        ips: &[S],
        format: ResponseFormat,
    ) -> Result<ApplianceResponse, CspcError> {
        let identifier = chrono::Utc::now().timestamp().to_string();
        let mut template = self.templates.load_request(RequestTemplate::DiscoverDevices)?;

        let job = self.templates.find_container(&mut template, "DiscoveryJob")?;
        set_attribute(job, "identifier", identifier.as_str());

        let list = self.templates.find_container(&mut template, "IPAddressList")?;
        for ip in ips {
            self.templates.append_child(list, "IPAddress", ip.as_ref());
        }

        info!("Discovery job {} for {} addresses", identifier, ips.len());
        self.submit(&template, format).await
    }

    /// Upload a seed-file body and schedule its import into `device_group`
    pub async fn import_seed_file(&self, csv: &str, device_group: &str) -> Result<String, CspcError> {
        self.transport.post_seed_file(csv, device_group).await
    }

    /// Upload rows as a seed file
    pub async fn import_seed_rows(
        &self,
        rows: &[SeedRow],
        device_group: &str,
    ) -> Result<String, CspcError> {
        info!("Importing {} seed rows into group '{}'", rows.len(), device_group);
        self.import_seed_file(&seed_file_body(rows), device_group).await
    }

    async fn device_elements(&self) -> Result<Vec<Element>, CspcError> {
        let template = self.templates.load_request(RequestTemplate::GetAllDevices)?;
        let payload = self.templates.serialize(&template)?;
        let body = self.transport.post_xml(&payload).await?;

        let root = decode::parse_document(&body)?;
        let mut devices = Vec::new();
        collect_descendants(&root, "Device", &mut devices);

        info!("num devices: {}", devices.len());
        Ok(devices)
    }

    async fn submit(
        &self,
        template: &Template,
        format: ResponseFormat,
    ) -> Result<ApplianceResponse, CspcError> {
        let payload = self.templates.serialize(template)?;
        let body = self.transport.post_xml(&payload).await?;

        match format {
            ResponseFormat::Xml => Ok(ApplianceResponse::Xml(body)),
            ResponseFormat::Structured => {
                Ok(ApplianceResponse::Structured(decode::decode_one(body.as_str())?))
            }
        }
    }

    fn credential_element(&self, credential: &DeviceCredential) -> Element {
        let templates = &self.templates;
        let mut element = templates.element("DeviceCredential");
        set_attribute(&mut element, "identifier", credential.identifier.as_str());

        templates.append_child(&mut element, "Protocol", credential.protocol().as_str());
        match &credential.secret {
            CredentialSecret::Snmpv2c {
                read_community,
                write_community,
            } => {
                templates.append_child(&mut element, "ReadCommunity", read_community);
                templates.append_child(&mut element, "WriteCommunity", write_community);
            }
            CredentialSecret::Sshv2 {
                user,
                password,
                enable_password,
            } => {
                templates.append_child(&mut element, "UserName", user);
                templates.append_child(&mut element, "Password", password);
                templates.append_child(&mut element, "EnablePassword", enable_password);
            }
        }

        let mut expressions = templates.element("IpExpressionList");
        templates.append_child(&mut expressions, "IpExpression", &credential.ip_expression);
        append_element(&mut element, expressions);
        element
    }
}

/// Text of the first child named `tag`; `Some("")` for an empty element
fn child_text(element: &Element, tag: &str) -> Option<String> {
    element
        .get_child(tag)
        .map(|child| child.get_text().map(|t| t.into_owned()).unwrap_or_default())
}

/// Flat record of a device's child elements; the first of repeated tags wins
fn device_record(device: &Element) -> DeviceRecord {
    let mut record = DeviceRecord::new();
    for child in device.children.iter().filter_map(XMLNode::as_element) {
        record
            .entry(child.name.clone())
            .or_insert_with(|| child.get_text().map(|t| t.into_owned()).unwrap_or_default());
    }
    record
}

fn collect_descendants(element: &Element, tag: &str, found: &mut Vec<Element>) {
    for child in element.children.iter().filter_map(XMLNode::as_element) {
        if child.name == tag {
            found.push(child.clone());
        }
        collect_descendants(child, tag, found);
    }
}
