pub mod cloud_client;
pub mod cloud_log_sink;
pub mod cloud_severity;
pub mod http;
pub mod http_client;
pub mod metadata;
pub mod project;
#[cfg(test)]
mod test_server;
pub mod token;

pub use cloud_client::{CloudEntry, CloudLogClient};
pub use cloud_log_sink::CloudLogSink;
pub use cloud_severity::CloudSeverity;
pub use http_client::HttpCloudClient;
pub use project::{AmbientProject, FixedProject, ProjectResolver};
pub use token::TokenSource;

/// Settings for [`crate::log::Logger::cloud`].
///
/// Every field is optional: the log name defaults to the module, the project
/// and the access token are discovered from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudOptions {
    pub log_name: Option<String>,
    pub project: Option<String>,
    pub access_token: Option<String>,
}
