use std::io;

use thiserror::Error;

/// Errors surfaced by logger construction, `Logger::write`, configuration
/// loading and the cloud transport.
///
/// Transport errors never escape the leveled calls (`info`, `warn`, ...);
/// sinks report them through `tracing` and carry on.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("module name is required")]
    MissingModule,

    #[error("project not found")]
    ProjectNotFound,

    #[error("cannot resolve project identity: {0}")]
    Identity(String),

    #[error("invalid log level {0}")]
    UnsupportedLevel(i8),

    #[error("logging client already closed")]
    Closed,

    #[error("logging service answered {status}: {body}")]
    Http { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
