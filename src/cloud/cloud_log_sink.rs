use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    cloud::{
        CloudOptions,
        cloud_client::{CloudEntry, CloudLogClient},
        http_client::HttpCloudClient,
        project::{AmbientProject, FixedProject, ProjectResolver},
    },
    error::LogError,
    log::{log_entry::LogEntry, log_sink::LogSink},
};

/// Sink forwarding every entry to a remote [`CloudLogClient`].
///
/// Writes are synchronous. A failed write is reported through `tracing` and
/// dropped; logging calls never fail.
pub struct CloudLogSink {
    client: Box<dyn CloudLogClient>,
    project: String,
    log_name: String,
    closed: AtomicBool,
}

impl CloudLogSink {
    /// Resolves the project (explicit, else ambient) and opens an HTTPS client.
    ///
    /// # Errors
    ///
    /// See [`CloudLogSink::connect_with`], plus TLS setup errors.
    pub fn connect(log_name: &str, options: &CloudOptions) -> Result<Self, LogError> {
        let token = options.access_token.clone();
        let make_client = move |project: &str| -> Result<Box<dyn CloudLogClient>, LogError> {
            Ok(Box::new(HttpCloudClient::new(project, token)?))
        };

        match options.project.as_deref().filter(|p| !p.is_empty()) {
            Some(project) => Self::connect_with(log_name, &FixedProject(project.to_owned()), make_client),
            None => Self::connect_with(log_name, &AmbientProject::from_env(), make_client),
        }
    }

    /// Builds a sink from a project resolver and a client factory.
    ///
    /// # Errors
    ///
    /// * [`LogError::MissingModule`] if `log_name` is empty.
    /// * the resolver's error, or [`LogError::ProjectNotFound`] if it yields
    ///   an empty project.
    /// * the factory's error.
    pub fn connect_with<F>(log_name: &str, resolver: &dyn ProjectResolver, make_client: F) -> Result<Self, LogError>
    where
        F: FnOnce(&str) -> Result<Box<dyn CloudLogClient>, LogError>,
    {
        if log_name.is_empty() {
            return Err(LogError::MissingModule);
        }
        let project = resolver.current_project()?;
        if project.is_empty() {
            return Err(LogError::ProjectNotFound);
        }
        let client = make_client(&project)?;
        tracing::debug!(%project, log_name, "cloud log sink connected");

        Ok(Self {
            client,
            project,
            log_name: log_name.to_owned(),
            closed: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    #[must_use]
    pub fn log_name(&self) -> &str {
        &self.log_name
    }
}

impl LogSink for CloudLogSink {
    fn emit(&self, entry: &LogEntry<'_>) {
        if self.closed.load(Ordering::Acquire) {
            tracing::debug!(log_name = %self.log_name, "entry dropped, sink closed");
            return;
        }
        if let Err(e) = self.client.write_entry(&self.log_name, &CloudEntry::from(entry)) {
            tracing::warn!(error = %e, log_name = %self.log_name, "cloud log write failed");
        }
    }

    fn close(&self) -> Result<(), LogError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(LogError::Closed);
        }
        self.client.close()
    }
}
