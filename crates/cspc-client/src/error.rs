//! CSPC client errors

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the CSPC appliance
#[derive(Debug, Error)]
pub enum CspcError {
    /// Network-level failure (DNS, connection refused, TLS) reaching the appliance
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The appliance answered with a non-success status
    #[error("CSPC API error: {status} - {body}")]
    RemoteApi {
        /// HTTP status returned by the appliance
        status: StatusCode,
        /// Response headers, kept for caller inspection
        headers: HeaderMap,
        /// Raw response body
        body: String,
    },

    /// A request template file does not exist in the template directory
    #[error("Template not found: {name} ({})", path.display())]
    TemplateNotFound {
        /// Template file name
        name: String,
        /// Full path that was looked up
        path: PathBuf,
    },

    /// A request template could not be read for a reason other than absence
    #[error("Failed to read template {}: {source}", path.display())]
    TemplateIo {
        /// Full path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A request template is not well-formed XML
    #[error("Malformed template {name}: {source}")]
    MalformedTemplate {
        /// Template file name
        name: String,
        /// Parser error
        #[source]
        source: xmltree::ParseError,
    },

    /// A named insertion point is missing from a template
    #[error("Container <{tag}> not found in template {template}")]
    ContainerNotFound {
        /// Template file name
        template: String,
        /// Tag that was looked up
        tag: String,
    },

    /// A response body or fragment is not well-formed XML
    #[error("Malformed XML response: {0}")]
    MalformedResponse(#[source] xmltree::ParseError),

    /// Rendering a request document failed
    #[error("XML serialization error: {0}")]
    Serialization(#[from] xmltree::Error),

    /// A device field name that is not part of the known device schema
    #[error("Unknown device field: {0}")]
    UnknownField(String),

    /// Invalid request (e.g., missing required fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Client configuration cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
