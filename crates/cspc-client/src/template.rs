//! XML request templates
//!
//! Request bodies start from skeleton documents stored in a template
//! directory. A skeleton is parsed fresh for every call, list containers
//! (`DeviceList`, `IPAddressList`, `DeviceCredentialList`, ...) are filled
//! in, and the result is rendered with the configured namespace.

use crate::config::{ClientOptions, XmlNamespace};
use crate::error::CspcError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use xmltree::{Element, EmitterConfig, Namespace, XMLNode};

/// Request templates bundled with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTemplate {
    /// Fetch details of every known device
    GetAllDevices,
    /// Add devices (`DeviceList` container)
    AddDevices,
    /// Delete devices by id (`DeviceList` container)
    DeleteDevices,
    /// Discovery job (`DiscoveryJob` + `IPAddressList`)
    DiscoverDevices,
    /// Add credentials (`DeviceCredentialList` container)
    AddCredentials,
}

impl RequestTemplate {
    /// File name inside the template directory
    pub fn file_name(self) -> &'static str {
        match self {
            RequestTemplate::GetAllDevices => "get_details_of_all_devices.xml",
            RequestTemplate::AddDevices => "add_multiple_devices.xml",
            RequestTemplate::DeleteDevices => "delete_multiple_devices.xml",
            RequestTemplate::DiscoverDevices => "discover_multiple_devices.xml",
            RequestTemplate::AddCredentials => "add_multiple_device_credentials.xml",
        }
    }
}

/// A loaded, mutable request document
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    root: Element,
}

impl Template {
    /// Template file name this document was loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Mutable root element
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }
}

/// Loads templates and renders request documents
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    dir: PathBuf,
    namespace: XmlNamespace,
}

impl TemplateEngine {
    /// Create an engine reading from `dir` and writing `namespace`
    pub fn new(dir: impl Into<PathBuf>, namespace: XmlNamespace) -> Self {
        Self {
            dir: dir.into(),
            namespace,
        }
    }

    /// Engine configured from client options
    pub fn from_options(options: &ClientOptions) -> Self {
        Self::new(options.template_dir.clone(), options.namespace.clone())
    }

    /// Template directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Namespace applied to rendered documents
    pub fn namespace(&self) -> &XmlNamespace {
        &self.namespace
    }

    /// Load one of the bundled request templates
    pub fn load_request(&self, template: RequestTemplate) -> Result<Template, CspcError> {
        self.load(template.file_name())
    }

    /// Load and parse a named template file
    ///
    /// # Returns
    /// * `Err(CspcError::TemplateNotFound)` - The file does not exist
    /// * `Err(CspcError::MalformedTemplate)` - The file is not well-formed XML
    pub fn load(&self, name: &str) -> Result<Template, CspcError> {
        let path = self.dir.join(name);
        debug!("Loading template {}", path.display());

        let content = std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CspcError::TemplateNotFound {
                name: name.to_string(),
                path: path.clone(),
            },
            _ => CspcError::TemplateIo {
                path: path.clone(),
                source: e,
            },
        })?;

        let root = Element::parse(content.as_slice()).map_err(|e| CspcError::MalformedTemplate {
            name: name.to_string(),
            source: e,
        })?;

        Ok(Template {
            name: name.to_string(),
            root,
        })
    }

    /// Find the first element named `tag`, in document order
    ///
    /// Only elements in the configured namespace (or in no namespace) match.
    pub fn find_container<'a>(
        &self,
        template: &'a mut Template,
        tag: &str,
    ) -> Result<&'a mut Element, CspcError> {
        let uri = self.namespace.uri.as_str();
        if is_container(&template.root, tag, uri) {
            return Ok(&mut template.root);
        }

        let Template { name, root } = template;
        find_descendant_mut(root, tag, uri).ok_or_else(|| CspcError::ContainerNotFound {
            template: name.clone(),
            tag: tag.to_string(),
        })
    }

    /// New element in the configured namespace
    pub fn element(&self, tag: &str) -> Element {
        let mut element = Element::new(tag);
        element.namespace = Some(self.namespace.uri.clone());
        element.prefix = self.namespace.prefix.clone();
        element
    }

    /// Append a leaf `<tag>text</tag>` to `container`
    ///
    /// Children appear in the rendered document in call order.
    pub fn append_child(&self, container: &mut Element, tag: &str, text: &str) {
        let mut child = self.element(tag);
        if !text.is_empty() {
            child.children.push(XMLNode::Text(text.to_string()));
        }
        append_element(container, child);
    }

    /// Render the document as a UTF-8 string
    pub fn serialize(&self, template: &Template) -> Result<String, CspcError> {
        let mut root = template.root.clone();
        let prefix = self.namespace.prefix.as_deref().unwrap_or("");

        let mut namespaces = root.namespaces.take().unwrap_or_else(Namespace::empty);
        namespaces.force_put(prefix, self.namespace.uri.as_str());
        root.namespaces = Some(namespaces);
        root.namespace = Some(self.namespace.uri.clone());
        root.prefix = self.namespace.prefix.clone();

        let config = EmitterConfig::new()
            .perform_indent(true)
            .indent_string("  ");

        let mut output = Vec::new();
        root.write_with_config(&mut output, config)?;

        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

/// Append an already built element to `container`
pub fn append_element(container: &mut Element, child: Element) {
    container.children.push(XMLNode::Element(child));
}

/// Set (or replace) an attribute, keeping its position if already present
pub fn set_attribute(element: &mut Element, name: &str, value: impl Into<String>) {
    element.attributes.insert(name.to_string(), value.into());
}

fn is_container(element: &Element, tag: &str, uri: &str) -> bool {
    element.name == tag && element.namespace.as_deref().is_none_or(|ns| ns == uri)
}

fn find_descendant_mut<'a>(element: &'a mut Element, tag: &str, uri: &str) -> Option<&'a mut Element> {
    for node in element.children.iter_mut() {
        if let XMLNode::Element(child) = node {
            if is_container(child, tag, uri) {
                return Some(child);
            }
            if let Some(found) = find_descendant_mut(child, tag, uri) {
                return Some(found);
            }
        }
    }
    None
}
