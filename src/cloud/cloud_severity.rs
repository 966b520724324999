use crate::log::log_level::LogLevel;

/// Severities understood by the cloud logging service.
///
/// Only the values a [`LogLevel`] maps to are modelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloudSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Emergency,
}

impl CloudSeverity {
    /// Wire name of the severity.
    pub const fn as_str(self) -> &'static str {
        match self {
            CloudSeverity::Debug => "DEBUG",
            CloudSeverity::Info => "INFO",
            CloudSeverity::Warning => "WARNING",
            CloudSeverity::Error => "ERROR",
            CloudSeverity::Emergency => "EMERGENCY",
        }
    }
}

impl From<LogLevel> for CloudSeverity {
    fn from(level: LogLevel) -> Self {
        match level {
            // The service has no level below DEBUG
            LogLevel::Trace | LogLevel::Debug => CloudSeverity::Debug,
            LogLevel::Info => CloudSeverity::Info,
            LogLevel::Warn => CloudSeverity::Warning,
            LogLevel::Error => CloudSeverity::Error,
            LogLevel::Fatal => CloudSeverity::Emergency,
        }
    }
}
