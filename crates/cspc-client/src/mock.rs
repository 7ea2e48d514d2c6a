//! Mock transport for unit testing
//!
//! Records every payload and answers from a queue of canned responses, so
//! facade logic can be tested without a running appliance.

use crate::cspc_trait::CspcTransport;
use crate::error::CspcError;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    /// `GET /cspc/info`
    Info,
    /// `POST /cspc/xml` with its body
    Xml(String),
    /// `POST /cspc/seedfile` with CSV body and device group
    SeedFile {
        /// CSV payload
        csv: String,
        /// Device group
        device_group: String,
    },
}

#[derive(Debug, Clone)]
enum Reply {
    Ok(String),
    Status(StatusCode, String),
}

/// Mock transport for testing
#[derive(Debug, Clone, Default)]
pub struct MockCspcTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockCspcTransport {
    /// Create a mock with no queued replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with `body`
    pub fn push_ok(&self, body: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Reply::Ok(body.into()));
    }

    /// Queue a non-success response
    pub fn push_status(&self, status: StatusCode, body: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Status(status, body.into()));
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Bodies of the XML requests received so far
    pub fn xml_payloads(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                RecordedRequest::Xml(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    fn record(&self, request: RecordedRequest) {
        self.requests.lock().unwrap().push(request);
    }

    fn next_reply(&self) -> Result<String, CspcError> {
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Ok(body)) => Ok(body),
            Some(Reply::Status(status, body)) => Err(CspcError::RemoteApi {
                status,
                headers: HeaderMap::new(),
                body,
            }),
            None => Err(CspcError::InvalidRequest(
                "mock transport has no queued reply".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl CspcTransport for MockCspcTransport {
    async fn get_info(&self) -> Result<String, CspcError> {
        self.record(RecordedRequest::Info);
        self.next_reply()
    }

    async fn post_xml(&self, payload: &str) -> Result<String, CspcError> {
        self.record(RecordedRequest::Xml(payload.to_string()));
        self.next_reply()
    }

    async fn post_seed_file(&self, csv: &str, device_group: &str) -> Result<String, CspcError> {
        self.record(RecordedRequest::SeedFile {
            csv: csv.to_string(),
            device_group: device_group.to_string(),
        });
        self.next_reply()
    }
}
