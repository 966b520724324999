use std::{
    fmt, io,
    path::Path,
    sync::atomic::{AtomicI8, Ordering},
};

use crate::{
    cloud::{CloudLogSink, CloudOptions},
    error::LogError,
    log::{
        json_log_sink::{Destination, JsonLogSink},
        log_entry::LogEntry,
        log_level::{self, LogLevel},
        log_sink::LogSink,
    },
};

/// Process termination capability used by the fatal calls.
///
/// Defaults to [`std::process::exit`]. Tests inject a hook that panics so the
/// emit-then-terminate sequence can be observed without ending the process.
pub type ExitHook = fn(i32) -> !;

/// Exit status used by `fatal` and `fatal_fmt`.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Leveled logger.
///
/// Holds a threshold, a module name, the host name (resolved once) and an
/// exclusively owned [`LogSink`]. Every leveled call checks the threshold
/// first and returns without touching the sink when filtered; Error and Fatal
/// calls always emit.
///
/// All methods take `&self`, so a logger can be shared behind an `Arc`. The
/// threshold is an atomic: a call racing with [`Logger::set_level`] sees
/// either the old or the new value.
///
/// # Examples
///
/// ```rust,ignore
/// let out = MemoryWriter::new();
/// let logger = Logger::local("api", LogLevel::Info, false, [Some(Box::new(out.clone()) as Destination)]);
/// logger.debug("dropped");
/// logger.info("kept");
/// modlog::logger_info!(logger, "listening on {}", 8080);
/// ```
pub struct Logger {
    level: AtomicI8,
    module: String,
    host: String,
    sink: Box<dyn LogSink>,
    exit: ExitHook,
}

impl Logger {
    /// Creates a logger over an arbitrary sink.
    pub fn new(module: impl Into<String>, level: LogLevel, sink: Box<dyn LogSink>) -> Self {
        Self {
            level: AtomicI8::new(level.as_i8()),
            module: module.into(),
            host: resolve_host(),
            sink,
            exit: std::process::exit,
        }
    }

    /// Creates a logger writing JSON records to `destinations`.
    ///
    /// `None` destinations are skipped. When `console` is set, a
    /// human-readable line is also rendered to stdout.
    pub fn local<I>(module: impl Into<String>, level: LogLevel, console: bool, destinations: I) -> Self
    where
        I: IntoIterator<Item = Option<Destination>>,
    {
        Self::new(module, level, Box::new(JsonLogSink::new(console, destinations)))
    }

    /// Creates a logger forwarding to the cloud logging service.
    ///
    /// The log name defaults to `module`.
    ///
    /// # Errors
    ///
    /// * [`LogError::MissingModule`] if `module` is empty.
    /// * [`LogError::Identity`] / [`LogError::ProjectNotFound`] if no project
    ///   can be resolved.
    /// * Transport setup errors from the HTTPS client.
    pub fn cloud(module: &str, level: LogLevel, options: &CloudOptions) -> Result<Self, LogError> {
        if module.is_empty() {
            return Err(LogError::MissingModule);
        }
        let log_name = options.log_name.as_deref().unwrap_or(module);
        let sink = CloudLogSink::connect(log_name, options)?;
        Ok(Self::new(module, level, Box::new(sink)))
    }

    /// Logger used as the process default: module tagged with the program
    /// name, most verbose level, console only.
    #[must_use]
    pub fn process_default() -> Self {
        Self::local(program_name(), LogLevel::Trace, true, std::iter::empty())
    }

    /// Replaces the process termination hook.
    #[must_use]
    pub fn with_exit_hook(mut self, exit: ExitHook) -> Self {
        self.exit = exit;
        self
    }

    /// Overrides the host name written into every record.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Replaces the threshold. Takes effect for every subsequent call.
    pub fn set_level(&self, level: LogLevel) {
        self.set_raw_level(level.as_i8());
    }

    /// Replaces the threshold with a raw value. No range check is made here;
    /// an unknown value only surfaces through [`Logger::write`].
    pub fn set_raw_level(&self, raw: i8) {
        self.level.store(raw, Ordering::Relaxed);
    }

    #[must_use]
    pub fn raw_level(&self) -> i8 {
        self.level.load(Ordering::Relaxed)
    }

    /// Configured level, `None` if the raw threshold is not a known level.
    #[must_use]
    pub fn level(&self) -> Option<LogLevel> {
        LogLevel::from_i8(self.raw_level())
    }

    /// Whether a call at `level` passes the threshold. Use it to skip building
    /// expensive messages.
    #[inline]
    #[must_use]
    pub fn has_level(&self, level: LogLevel) -> bool {
        log_level::has_level(self.raw_level(), level)
    }

    #[inline]
    fn enabled(&self, level: LogLevel) -> bool {
        level.always_emits() || self.has_level(level)
    }

    fn emit(&self, level: LogLevel, message: &str) {
        let entry = LogEntry::now(level, &self.module, &self.host, message);
        self.sink.emit(&entry);
    }

    /// Logs `msg` at `level` if it passes the filter.
    ///
    /// `LogLevel::Fatal` goes through [`Logger::fatal`] and does not return.
    pub fn log(&self, level: LogLevel, msg: &str) {
        if level == LogLevel::Fatal {
            self.fatal(msg);
        }
        if !self.enabled(level) {
            return;
        }
        self.emit(level, msg);
    }

    /// Formatted variant of [`Logger::log`]. Nothing is formatted when the call
    /// is filtered.
    pub fn log_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if level == LogLevel::Fatal {
            self.fatal_fmt(args);
        }
        if !self.enabled(level) {
            return;
        }
        match args.as_str() {
            Some(s) => self.emit(level, s),
            None => self.emit(level, &args.to_string()),
        }
    }

    pub fn trace(&self, msg: &str) {
        self.log(LogLevel::Trace, msg);
    }

    pub fn trace_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Trace, args);
    }

    pub fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn debug_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Debug, args);
    }

    pub fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }

    pub fn info_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Info, args);
    }

    pub fn warn(&self, msg: &str) {
        self.log(LogLevel::Warn, msg);
    }

    pub fn warn_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Warn, args);
    }

    /// Always emitted, whatever the threshold.
    pub fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }

    pub fn error_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Error, args);
    }

    /// Logs at Debug; kept for callers used to a plain `print` entry point.
    pub fn print(&self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn print_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Debug, args);
    }

    /// Emits `msg` at Fatal, whatever the threshold, then terminates the
    /// process with status [`FATAL_EXIT_CODE`].
    pub fn fatal(&self, msg: &str) -> ! {
        self.emit(LogLevel::Fatal, msg);
        (self.exit)(FATAL_EXIT_CODE)
    }

    pub fn fatal_fmt(&self, args: fmt::Arguments<'_>) -> ! {
        match args.as_str() {
            Some(s) => self.emit(LogLevel::Fatal, s),
            None => self.emit(LogLevel::Fatal, &args.to_string()),
        }
        (self.exit)(FATAL_EXIT_CODE)
    }

    /// Emits `data` as one message at the configured level.
    ///
    /// Returns the number of bytes consumed, always `data.len()` on success.
    ///
    /// # Errors
    ///
    /// [`LogError::UnsupportedLevel`] if the configured level is not one of
    /// Trace, Debug, Info, Warn or Error. Nothing is emitted in that case.
    pub fn write(&self, data: &[u8]) -> Result<usize, LogError> {
        let raw = self.raw_level();
        let level = LogLevel::from_i8(raw)
            .filter(|l| l.is_writable())
            .ok_or(LogError::UnsupportedLevel(raw))?;
        self.emit(level, &String::from_utf8_lossy(data));
        Ok(data.len())
    }

    /// Releases the sink: flushes local destinations, closes the cloud client.
    ///
    /// # Errors
    ///
    /// Propagates the sink's close error.
    pub fn close(&self) -> Result<(), LogError> {
        self.sink.close()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("module", &self.module)
            .field("host", &self.host)
            .field("level", &self.raw_level())
            .finish_non_exhaustive()
    }
}

fn to_io(e: LogError) -> io::Error {
    match e {
        LogError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidInput, other),
    }
}

// `write_fmt` is overridden so that `write!(logger, ...)` produces one
// record instead of one record per formatted piece.
impl io::Write for &Logger {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        Logger::write(*self, data).map_err(to_io)
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        let msg = args.to_string();
        Logger::write(*self, msg.as_bytes()).map(drop).map_err(to_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for Logger {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        Logger::write(self, data).map_err(to_io)
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        let msg = args.to_string();
        Logger::write(self, msg.as_bytes()).map(drop).map_err(to_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Name of the running executable, or `"global"` when it cannot be resolved.
pub fn program_name() -> String {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::file_stem)
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map_or_else(|| "global".to_owned(), str::to_owned)
}

#[cfg(unix)]
fn resolve_host() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_default()
}

#[cfg(not(unix))]
fn resolve_host() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::memory_writer::MemoryWriter;
    use std::{
        io::Write,
        panic::{self, AssertUnwindSafe},
        sync::{Arc, Mutex},
    };

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<(LogLevel, String)>>,
    }

    impl LogSink for Arc<RecordingSink> {
        fn emit(&self, entry: &LogEntry<'_>) {
            self.seen
                .lock()
                .unwrap()
                .push((entry.level, entry.message.to_owned()));
        }
    }

    fn recording(level: LogLevel) -> (Logger, Arc<RecordingSink>) {
        let rec = Arc::new(RecordingSink::default());
        let logger = Logger::new("unit", level, Box::new(Arc::clone(&rec)));
        (logger, rec)
    }

    fn panic_exit(code: i32) -> ! {
        panic!("exit({code})")
    }

    #[test]
    fn filtered_calls_never_reach_the_sink() {
        let (logger, rec) = recording(LogLevel::Warn);
        logger.trace("t");
        logger.debug("d");
        logger.info("i");
        logger.print("p");
        logger.warn("w");
        assert_eq!(*rec.seen.lock().unwrap(), vec![(LogLevel::Warn, "w".to_owned())]);
    }

    #[test]
    fn error_bypasses_threshold() {
        let (logger, rec) = recording(LogLevel::Fatal);
        logger.warn("hidden");
        logger.error("visible");
        logger.error_fmt(format_args!("code {}", 7));
        let seen = rec.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], (LogLevel::Error, "code 7".to_owned()));
    }

    #[test]
    fn formatted_variants_substitute_arguments() {
        let (logger, rec) = recording(LogLevel::Trace);
        logger.trace_fmt(format_args!("{}-{:03}", "a", 7));
        logger.info_fmt(format_args!("Hello, {}!", "Mr. Anderson"));
        let seen = rec.seen.lock().unwrap();
        assert_eq!(seen[0].1, "a-007");
        assert_eq!(seen[1].1, "Hello, Mr. Anderson!");
    }

    #[test]
    fn set_level_applies_immediately() {
        let (logger, rec) = recording(LogLevel::Info);
        logger.debug("x");
        logger.set_level(LogLevel::Trace);
        assert_eq!(logger.level(), Some(LogLevel::Trace));
        logger.debug("y");
        assert_eq!(rec.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn write_uses_configured_level() {
        let (logger, rec) = recording(LogLevel::Warn);
        assert_eq!(logger.write(b"raw bytes").unwrap(), 9);
        assert_eq!(
            rec.seen.lock().unwrap()[0],
            (LogLevel::Warn, "raw bytes".to_owned())
        );
    }

    #[test]
    fn write_rejects_unknown_and_fatal_levels() {
        let (logger, rec) = recording(LogLevel::Info);
        logger.set_raw_level(12);
        assert_eq!(logger.level(), None);
        assert!(matches!(logger.write(b"x"), Err(LogError::UnsupportedLevel(12))));

        logger.set_level(LogLevel::Fatal);
        assert!(matches!(logger.write(b"x"), Err(LogError::UnsupportedLevel(4))));
        assert!(rec.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn io_write_adapter() {
        let (logger, rec) = recording(LogLevel::Debug);
        let mut w = &logger;
        write!(w, "via io {}", 1).unwrap();
        let seen = rec.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(LogLevel::Debug, "via io 1".to_owned())]);

        logger.set_raw_level(-5);
        let err = io::Write::write(&mut &logger, b"nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn fatal_emits_then_calls_exit_hook() {
        let (logger, rec) = recording(LogLevel::Fatal);
        let logger = logger.with_exit_hook(panic_exit);

        let res: Result<(), _> =
            panic::catch_unwind(AssertUnwindSafe(|| logger.fatal("going down")));
        let payload = res.unwrap_err();
        assert_eq!(payload.downcast_ref::<String>().unwrap(), "exit(1)");
        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![(LogLevel::Fatal, "going down".to_owned())]
        );
    }

    #[test]
    fn fatal_fmt_ignores_threshold() {
        let (logger, rec) = recording(LogLevel::Fatal);
        let logger = logger.with_exit_hook(panic_exit);
        logger.set_raw_level(100);

        let res: Result<(), _> = panic::catch_unwind(AssertUnwindSafe(|| {
            logger.fatal_fmt(format_args!("{} failed", "db"))
        }));
        assert!(res.is_err());
        assert_eq!(rec.seen.lock().unwrap()[0].1, "db failed");
    }

    #[test]
    fn log_at_fatal_level_terminates() {
        let (logger, rec) = recording(LogLevel::Info);
        let logger = logger.with_exit_hook(panic_exit);

        let res: Result<(), _> =
            panic::catch_unwind(AssertUnwindSafe(|| logger.log(LogLevel::Fatal, "no way back")));
        assert!(res.is_err());
        let res: Result<(), _> = panic::catch_unwind(AssertUnwindSafe(|| {
            logger.log_fmt(LogLevel::Fatal, format_args!("{} way back", "no"))
        }));
        assert!(res.is_err());

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![
                (LogLevel::Fatal, "no way back".to_owned()),
                (LogLevel::Fatal, "no way back".to_owned()),
            ]
        );
    }

    #[test]
    fn local_logger_records_carry_module_and_host() {
        let out = MemoryWriter::new();
        let logger = Logger::local(
            "svc",
            LogLevel::Info,
            false,
            [Some(Box::new(out.clone()) as Destination)],
        )
        .with_host("node-7");
        logger.info("hi");

        let v: serde_json::Value = serde_json::from_str(&out.lines()[0]).unwrap();
        assert_eq!(v["module"], "svc");
        assert_eq!(v["host"], "node-7");
        assert_eq!(v["level"], "info");
        assert_eq!(v["message"], "hi");
        assert!(v["time"].as_str().unwrap().ends_with('Z'));
        logger.close().unwrap();
    }

    #[test]
    fn program_name_is_never_empty() {
        assert!(!program_name().is_empty());
    }
}
