//! modlog is a leveled, module-tagged logging facade.
//!
//! A [`Logger`] filters calls against a threshold and hands every surviving
//! record to one sink:
//! - a local sink writing JSON lines to any number of destinations, with an
//!   optional human-readable console renderer;
//! - a cloud sink forwarding entries to a remote logging service.
//!
//! A process-wide default logger backs the free functions in [`log::global`]
//! and the `log_*!` macros.

/// Remote logging: project discovery, access tokens and the HTTPS client.
pub mod cloud;
/// Logger construction from TOML configuration files.
pub mod config;
/// Error type shared by every module.
pub mod error;
/// Levels, records, sinks, the `Logger` itself and the process default.
pub mod log;
/// TLS (Transport Layer Security) utility functions.
pub mod tls_utils;

pub use cloud::CloudOptions;
pub use config::LoggerConfig;
pub use error::LogError;
pub use log::{Destination, LogLevel, Logger, MemoryWriter};
