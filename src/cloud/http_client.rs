use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};

use reqwest::blocking::Client;
use serde::Serialize;

use crate::{
    cloud::{
        cloud_client::{CloudEntry, CloudLogClient},
        http,
        token::TokenSource,
    },
    error::LogError,
    tls_utils,
};

pub const LOGGING_ENDPOINT: &str = "https://logging.googleapis.com/v2/entries:write";

/// Client for the Cloud Logging `entries:write` REST endpoint.
///
/// Every entry is sent synchronously in its own request.
#[derive(Debug)]
pub struct HttpCloudClient {
    project: String,
    endpoint: String,
    client: Client,
    tokens: TokenSource,
    closed: AtomicBool,
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    entries: [WireEntry<'a>; 1],
}

#[derive(Serialize)]
struct MonitoredResource {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry<'a> {
    log_name: String,
    resource: MonitoredResource,
    severity: &'static str,
    text_payload: &'a str,
    timestamp: String,
    labels: BTreeMap<&'static str, &'a str>,
}

/// Percent-encodes a log id for use inside `logName`.
#[must_use]
pub fn encode_log_id(log_id: &str) -> String {
    let mut out = String::with_capacity(log_id.len());
    for b in log_id.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.') {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn write_request<'a>(project: &str, log_name: &str, entry: &CloudEntry<'a>) -> WriteRequest<'a> {
    WriteRequest {
        entries: [WireEntry {
            log_name: format!("projects/{project}/logs/{}", encode_log_id(log_name)),
            resource: MonitoredResource { kind: "global" },
            severity: entry.severity.as_str(),
            text_payload: entry.payload,
            timestamp: entry.timestamp(),
            labels: BTreeMap::from([("module", entry.module), ("host", entry.host)]),
        }],
    }
}

impl HttpCloudClient {
    /// Connects to the logging API for `project`, trusting the system CA
    /// bundle.
    ///
    /// # Errors
    ///
    /// [`LogError::Tls`] if no usable CA bundle exists,
    /// [`LogError::Transport`] if the HTTPS client cannot be built.
    pub fn new(project: impl Into<String>, access_token: Option<String>) -> Result<Self, LogError> {
        let tls = tls_utils::build_system_client_config().map_err(|e| LogError::Tls(e.to_string()))?;
        let client = Client::builder()
            .use_preconfigured_tls(tls)
            .timeout(http::WRITE_TIMEOUT)
            .build()?;
        Ok(Self::with_client(
            project,
            LOGGING_ENDPOINT,
            client,
            TokenSource::resolve(access_token),
        ))
    }

    /// Client posting to `endpoint` with a caller-built `reqwest` client.
    #[must_use]
    pub fn with_client(
        project: impl Into<String>,
        endpoint: impl Into<String>,
        client: Client,
        tokens: TokenSource,
    ) -> Self {
        Self {
            project: project.into(),
            endpoint: endpoint.into(),
            client,
            tokens,
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }
}

impl CloudLogClient for HttpCloudClient {
    fn write_entry(&self, log_name: &str, entry: &CloudEntry<'_>) -> Result<(), LogError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LogError::Closed);
        }
        let token = self.tokens.token()?;
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&write_request(&self.project, log_name, entry))
            .send()?;
        http::error_for_status(resp)?;
        Ok(())
    }

    fn close(&self) -> Result<(), LogError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(LogError::Closed);
        }
        Ok(())
    }
}
