use time::OffsetDateTime;

use crate::{
    cloud::cloud_severity::CloudSeverity,
    error::LogError,
    log::log_entry::{LogEntry, format_rfc3339},
};

/// One entry as handed to a [`CloudLogClient`].
#[derive(Debug, Clone)]
pub struct CloudEntry<'a> {
    pub severity: CloudSeverity,
    pub payload: &'a str,
    pub time: OffsetDateTime,
    pub module: &'a str,
    pub host: &'a str,
}

impl<'a> CloudEntry<'a> {
    #[must_use]
    pub fn timestamp(&self) -> String {
        format_rfc3339(self.time)
    }
}

impl<'a> From<&LogEntry<'a>> for CloudEntry<'a> {
    fn from(entry: &LogEntry<'a>) -> Self {
        Self {
            severity: entry.level.into(),
            payload: entry.message,
            time: entry.time,
            module: entry.module,
            host: entry.host,
        }
    }
}

/// Remote logging client bound to one project.
///
/// Calls are synchronous: `write_entry` returns once the service has
/// acknowledged the entry or the transport failed.
pub trait CloudLogClient: Send + Sync {
    /// # Errors
    ///
    /// Transport, authentication or service errors.
    fn write_entry(&self, log_name: &str, entry: &CloudEntry<'_>) -> Result<(), LogError>;

    /// Releases the client.
    ///
    /// # Errors
    ///
    /// Client-specific release errors.
    fn close(&self) -> Result<(), LogError> {
        Ok(())
    }
}
