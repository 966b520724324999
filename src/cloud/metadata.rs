use std::time::Duration;

use crate::{cloud::http, error::LogError};

/// Environment variable overriding the metadata server address (`host[:port]`).
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// Compute metadata server, reachable over plain HTTP from inside the cloud.
///
/// Every lookup is bounded by a timeout, so off-cloud lookups fail instead of
/// hanging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataServer {
    host: String,
    port: u16,
    timeout: Duration,
}

impl MetadataServer {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: http::METADATA_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Address from `GCE_METADATA_HOST`, or the well-known host name.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(METADATA_HOST_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .map_or_else(|| Self::new(DEFAULT_METADATA_HOST, 80), |s| Self::parse(&s))
    }

    fn parse(addr: &str) -> Self {
        match addr.rsplit_once(':') {
            Some((host, port)) => match port.parse() {
                Ok(port) => Self::new(host, port),
                Err(_) => Self::new(addr, 80),
            },
            None => Self::new(addr, 80),
        }
    }

    /// Fetches `/computeMetadata/v1/<path>` and returns the trimmed body.
    ///
    /// # Errors
    ///
    /// [`LogError::Transport`] for connection errors and timeouts,
    /// [`LogError::Http`] for a non-2xx answer.
    pub fn get(&self, path: &str) -> Result<String, LogError> {
        let url = format!("http://{}:{}/computeMetadata/v1/{path}", self.host, self.port);
        let resp = http::metadata_client(self.timeout)?
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()?;
        let body = http::error_for_status(resp)?.text()?;
        Ok(body.trim().to_owned())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::cloud::test_server::{black_hole, serve_once};
    use std::time::Instant;

    #[test]
    fn parse_host_and_port() {
        assert_eq!(MetadataServer::parse("10.0.0.1:8080"), MetadataServer::new("10.0.0.1", 8080));
        assert_eq!(MetadataServer::parse("meta"), MetadataServer::new("meta", 80));
    }

    #[test]
    fn get_sends_flavor_header() {
        let (port, server) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\nmy-project\n");
        let md = MetadataServer::new("127.0.0.1", port);

        assert_eq!(md.get("project/project-id").unwrap(), "my-project");
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /computeMetadata/v1/project/project-id HTTP/1.1\r\n"));
        assert!(request.to_ascii_lowercase().contains("metadata-flavor: google\r\n"));
    }

    #[test]
    fn non_success_is_an_error() {
        let (port, server) = serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 7\r\n\r\nmissing");
        let md = MetadataServer::new("127.0.0.1", port);

        match md.get("project/project-id") {
            Err(LogError::Http { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "missing");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn silent_server_times_out() {
        let (port, _listener) = black_hole();
        let md = MetadataServer::new("127.0.0.1", port).with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        assert!(matches!(md.get("project/project-id"), Err(LogError::Transport(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn oversized_chunk_header_is_an_error_not_a_panic() {
        let (port, server) = serve_once(
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n1\r\na\r\nffffffffffffffff\r\n",
        );
        let md = MetadataServer::new("127.0.0.1", port).with_timeout(Duration::from_secs(2));

        assert!(md.get("project/project-id").is_err());
        server.join().unwrap();
    }
}
