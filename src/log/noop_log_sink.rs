use crate::log::{log_entry::LogEntry, log_sink::LogSink};

/// Sink that discards every entry.
#[derive(Debug, Clone, Default)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    #[inline]
    fn emit(&self, _entry: &LogEntry<'_>) {}
}
