use serde::{Serialize, Serializer};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::log::log_level::LogLevel;

/// Represents a single log record.
///
/// Entries borrow from the logger that builds them and live only for the
/// duration of one `LogSink::emit` call. Serializing an entry yields the
/// interchange format written by the local sink:
///
/// ```text
/// {"level":"info","time":"2024-05-01T10:00:00.123456789Z","module":"api","host":"web-1","message":"hi"}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry<'a> {
    /// The severity level of the record.
    #[serde(serialize_with = "serialize_level")]
    pub level: LogLevel,
    /// Wall-clock time the call was made, UTC.
    #[serde(serialize_with = "serialize_time")]
    pub time: OffsetDateTime,
    /// Caller-chosen label identifying the logical source.
    pub module: &'a str,
    /// Host name resolved once when the logger was built.
    pub host: &'a str,
    /// The actual content of the record.
    pub message: &'a str,
}

impl<'a> LogEntry<'a> {
    /// Creates an entry stamped with the current time.
    pub fn now(level: LogLevel, module: &'a str, host: &'a str, message: &'a str) -> Self {
        Self {
            level,
            time: OffsetDateTime::now_utc(),
            module,
            host,
            message,
        }
    }

    /// RFC3339 timestamp with nanoseconds (trailing zeros trimmed).
    pub fn timestamp(&self) -> String {
        format_rfc3339(self.time)
    }

    /// Encodes the entry as one JSON line, newline included.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if encoding fails.
    pub fn to_json_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

pub(crate) fn format_rfc3339(time: OffsetDateTime) -> String {
    // Only fails for years outside 0..=9999
    time.format(&Rfc3339)
        .unwrap_or_else(|_| time.unix_timestamp().to_string())
}

fn serialize_level<S: Serializer>(level: &LogLevel, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(level.as_str())
}

fn serialize_time<S: Serializer>(time: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_rfc3339(*time))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use time::macros::datetime;

    #[test]
    fn json_line_has_interchange_fields_in_order() {
        let entry = LogEntry {
            level: LogLevel::Warn,
            time: datetime!(2024-05-01 10:00:00.5 UTC),
            module: "api",
            host: "web-1",
            message: "disk \"almost\" full",
        };

        let line = String::from_utf8(entry.to_json_line().unwrap()).unwrap();
        assert_eq!(
            line,
            "{\"level\":\"warn\",\"time\":\"2024-05-01T10:00:00.5Z\",\"module\":\"api\",\
             \"host\":\"web-1\",\"message\":\"disk \\\"almost\\\" full\"}\n"
        );
    }

    #[test]
    fn timestamp_keeps_nanoseconds() {
        let entry = LogEntry {
            level: LogLevel::Info,
            time: datetime!(2023-01-02 03:04:05.123456789 UTC),
            module: "m",
            host: "h",
            message: "x",
        };
        assert_eq!(entry.timestamp(), "2023-01-02T03:04:05.123456789Z");
    }
}
