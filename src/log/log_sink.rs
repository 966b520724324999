use crate::{error::LogError, log::log_entry::LogEntry};

/// Capability implemented by every backend a `Logger` can delegate to.
///
/// `emit` is infallible from the caller's point of view: a sink that fails to
/// deliver an entry reports it through its own diagnostics and returns.
pub trait LogSink: Send + Sync {
    fn emit(&self, entry: &LogEntry<'_>);

    /// Releases the resources held by the sink.
    ///
    /// # Errors
    ///
    /// Sinks backed by a network client return [`LogError::Closed`] when
    /// closed twice.
    fn close(&self) -> Result<(), LogError> {
        Ok(())
    }
}
