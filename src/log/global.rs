//! Process default logger.
//!
//! Created lazily on first use with [`Logger::process_default`]: module tagged
//! with the program name, Trace level, console output. Code that needs
//! isolation should build its own [`Logger`] and pass it around instead.
//!
//! The functions below forward to the current default after re-checking the
//! level, so a filtered call does not even load the instance's sink.
//! [`set_default`] swaps the instance atomically; calls already in flight
//! finish on the instance they loaded.

use std::{
    fmt,
    sync::{Arc, LazyLock},
};

use arc_swap::ArcSwap;

use crate::{
    error::LogError,
    log::{log_level::LogLevel, logger::Logger},
};

static DEFAULT: LazyLock<ArcSwap<Logger>> =
    LazyLock::new(|| ArcSwap::from_pointee(Logger::process_default()));

/// Shared handle to the current default logger.
pub fn default_logger() -> Arc<Logger> {
    DEFAULT.load_full()
}

/// Installs `logger` as the process default and returns the previous one.
pub fn set_default(logger: Logger) -> Arc<Logger> {
    DEFAULT.swap(Arc::new(logger))
}

pub fn set_level(level: LogLevel) {
    DEFAULT.load().set_level(level);
}

pub fn set_raw_level(raw: i8) {
    DEFAULT.load().set_raw_level(raw);
}

pub fn has_level(level: LogLevel) -> bool {
    DEFAULT.load().has_level(level)
}

/// Forwarding target of the `log_*!` macros.
pub fn log_fmt(level: LogLevel, args: fmt::Arguments<'_>) {
    let logger = DEFAULT.load();
    if !level.always_emits() && !logger.has_level(level) {
        return;
    }
    logger.log_fmt(level, args);
}

pub fn log(level: LogLevel, msg: &str) {
    let logger = DEFAULT.load();
    if !level.always_emits() && !logger.has_level(level) {
        return;
    }
    logger.log(level, msg);
}

pub fn trace(msg: &str) {
    log(LogLevel::Trace, msg);
}

pub fn trace_fmt(args: fmt::Arguments<'_>) {
    log_fmt(LogLevel::Trace, args);
}

pub fn debug(msg: &str) {
    log(LogLevel::Debug, msg);
}

pub fn debug_fmt(args: fmt::Arguments<'_>) {
    log_fmt(LogLevel::Debug, args);
}

pub fn info(msg: &str) {
    log(LogLevel::Info, msg);
}

pub fn info_fmt(args: fmt::Arguments<'_>) {
    log_fmt(LogLevel::Info, args);
}

pub fn warn(msg: &str) {
    log(LogLevel::Warn, msg);
}

pub fn warn_fmt(args: fmt::Arguments<'_>) {
    log_fmt(LogLevel::Warn, args);
}

pub fn error(msg: &str) {
    log(LogLevel::Error, msg);
}

pub fn error_fmt(args: fmt::Arguments<'_>) {
    log_fmt(LogLevel::Error, args);
}

pub fn print(msg: &str) {
    log(LogLevel::Debug, msg);
}

pub fn print_fmt(args: fmt::Arguments<'_>) {
    log_fmt(LogLevel::Debug, args);
}

/// Emits at Fatal on the default logger, then terminates through its exit hook.
pub fn fatal(msg: &str) -> ! {
    DEFAULT.load_full().fatal(msg)
}

pub fn fatal_fmt(args: fmt::Arguments<'_>) -> ! {
    DEFAULT.load_full().fatal_fmt(args)
}

/// `Logger::write` on the default logger.
///
/// # Errors
///
/// [`LogError::UnsupportedLevel`] if the default logger's level is not writable.
pub fn write(data: &[u8]) -> Result<usize, LogError> {
    DEFAULT.load().write(data)
}

/// Closes the default logger's sink.
///
/// # Errors
///
/// Propagates the sink's close error.
pub fn close() -> Result<(), LogError> {
    DEFAULT.load().close()
}
