use std::{
    io::Write,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    error::LogError,
    log::{console_writer::ConsoleWriter, log_entry::LogEntry, log_sink::LogSink},
};

/// A byte-stream destination for JSON records.
pub type Destination = Box<dyn Write + Send>;

/// Local sink: encodes each entry as one JSON line and fans it out to every
/// destination, optionally rendering a human-readable line to a console.
///
/// Destination failures are best-effort: a failing destination is reported
/// through `tracing` and the remaining destinations still receive the record.
pub struct JsonLogSink {
    destinations: Mutex<Vec<Destination>>,
    console: Option<Mutex<ConsoleWriter>>,
}

impl JsonLogSink {
    /// Builds the sink from an ordered list of optional destinations.
    ///
    /// `None` entries are skipped; the remaining destinations keep their order.
    /// When `console` is set, a stdout [`ConsoleWriter`] is attached.
    pub fn new<I>(console: bool, destinations: I) -> Self
    where
        I: IntoIterator<Item = Option<Destination>>,
    {
        let console = console.then(ConsoleWriter::stdout);
        Self::with_console(console, destinations)
    }

    /// Same as [`JsonLogSink::new`] with an explicit console renderer.
    pub fn with_console<I>(console: Option<ConsoleWriter>, destinations: I) -> Self
    where
        I: IntoIterator<Item = Option<Destination>>,
    {
        let destinations: Vec<Destination> = destinations.into_iter().flatten().collect();
        Self {
            destinations: Mutex::new(destinations),
            console: console.map(Mutex::new),
        }
    }

    /// Number of destinations kept after filtering (console excluded).
    pub fn destination_count(&self) -> usize {
        lock(&self.destinations).len()
    }

    #[must_use]
    pub fn has_console(&self) -> bool {
        self.console.is_some()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LogSink for JsonLogSink {
    fn emit(&self, entry: &LogEntry<'_>) {
        {
            let mut destinations = lock(&self.destinations);
            if !destinations.is_empty() {
                match entry.to_json_line() {
                    Ok(line) => {
                        for (idx, dest) in destinations.iter_mut().enumerate() {
                            if let Err(e) = dest.write_all(&line) {
                                tracing::warn!(destination = idx, error = %e, "log destination write failed");
                            }
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "log entry encoding failed"),
                }
            }
        }

        if let Some(console) = &self.console {
            if let Err(e) = lock(console).write_entry(entry) {
                tracing::warn!(error = %e, "console write failed");
            }
        }
    }

    fn close(&self) -> Result<(), LogError> {
        let mut first_err = None;
        for dest in lock(&self.destinations).iter_mut() {
            if let Err(e) = dest.flush() {
                first_err.get_or_insert(e);
            }
        }
        if let Some(console) = &self.console {
            if let Err(e) = lock(console).flush() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), |e| Err(LogError::Io(e)))
    }
}
