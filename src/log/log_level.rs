use std::{fmt, str::FromStr};

use crate::error::LogError;

/// Defines the severity levels for log messages.
///
/// The ordering is total and follows the raw value: a lower value is more
/// verbose. A logger configured at level `L` emits every call whose level is
/// `>= L`, with the exception of the always-emit levels (see
/// [`LogLevel::always_emits`]).
#[repr(i8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Designates very fine-grained informational events.
    Trace = -1,
    /// Designates fine-grained informational events that are most useful to debug an application.
    Debug = 0,
    /// Designates informational messages that highlight the progress of the application at coarse-grained level.
    Info = 1,
    /// Designates potentially harmful situations.
    Warn = 2,
    /// Designates error events that might still allow the application to continue running.
    Error = 3,
    /// Designates events after which the process terminates.
    Fatal = 4,
}

impl LogLevel {
    /// Every level, most verbose first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    #[inline]
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    /// Maps a raw value back to a level; `None` for anything outside `-1..=4`.
    pub const fn from_i8(raw: i8) -> Option<Self> {
        match raw {
            -1 => Some(LogLevel::Trace),
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Warn),
            3 => Some(LogLevel::Error),
            4 => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    /// Lowercase name, as written into the `level` field of a record.
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Three-letter tag used by the console renderer.
    pub const fn short_tag(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRC",
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warn => "WRN",
            LogLevel::Error => "ERR",
            LogLevel::Fatal => "FTL",
        }
    }

    /// Error and Fatal calls bypass the configured threshold and are always
    /// handed to the sink.
    #[inline]
    pub const fn always_emits(self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Fatal)
    }

    /// Levels that `Logger::write` can emit at. Fatal is excluded because
    /// writing must never terminate the process.
    #[inline]
    pub const fn is_writable(self) -> bool {
        !matches!(self, LogLevel::Fatal)
    }
}

/// Filtering predicate: a call at `candidate` passes a logger configured at
/// the raw threshold `current` iff `current <= candidate`.
#[inline]
pub const fn has_level(current: i8, candidate: LogLevel) -> bool {
    current <= candidate.as_i8()
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            other => Err(LogError::Config(format!("unknown log level `{other}`"))),
        }
    }
}

impl From<LogLevel> for i8 {
    fn from(level: LogLevel) -> Self {
        level.as_i8()
    }
}
