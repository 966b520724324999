//! Logger configuration loaded from TOML.
//!
//! ```toml
//! [logging]
//! module = "billing"
//! level = "info"
//! console = true
//! backend = "local"          # local | cloud | discard
//! files = ["~/logs/billing.jsonl"]
//!
//! [cloud]
//! log_name = "billing-api"
//! project = "my-project"
//! ```

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    cloud::CloudOptions,
    error::LogError,
    log::{
        json_log_sink::Destination,
        log_level::LogLevel,
        logger::{self, Logger},
        noop_log_sink::NoopLogSink,
    },
};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerConfig {
    pub logging: LoggingSection,
    pub cloud: CloudSection,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Local,
    Cloud,
    /// Drops every record.
    Discard,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSection {
    /// Module name; the program name when absent.
    pub module: Option<String>,
    pub level: String,
    pub console: bool,
    pub backend: Backend,
    /// JSON destinations, opened in append mode. `~` expands to the home
    /// directory.
    pub files: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            module: None,
            level: "info".to_owned(),
            console: true,
            backend: Backend::Local,
            files: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CloudSection {
    pub log_name: Option<String>,
    pub project: Option<String>,
    pub access_token: Option<String>,
}

impl From<&CloudSection> for CloudOptions {
    fn from(s: &CloudSection) -> Self {
        Self {
            log_name: s.log_name.clone(),
            project: s.project.clone(),
            access_token: s.access_token.clone(),
        }
    }
}

impl LoggerConfig {
    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`LogError::Io`] if the file cannot be read, [`LogError::Toml`] if it
    /// does not parse, [`LogError::Config`] for an unknown level.
    pub fn load(path: &Path) -> Result<Self, LogError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// # Errors
    ///
    /// See [`LoggerConfig::load`].
    pub fn from_toml_str(content: &str) -> Result<Self, LogError> {
        let config: Self = toml::from_str(content)?;
        config.level()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// [`LogError::Config`] if `logging.level` is not a known level name.
    pub fn level(&self) -> Result<LogLevel, LogError> {
        self.logging.level.parse()
    }

    #[must_use]
    pub fn module_name(&self) -> String {
        self.logging
            .module
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(logger::program_name)
    }

    /// Creates the logger described by this configuration.
    ///
    /// # Errors
    ///
    /// File open errors for local destinations, or the cloud constructor
    /// errors.
    pub fn build(&self) -> Result<Logger, LogError> {
        let level = self.level()?;
        let module = self.module_name();

        match self.logging.backend {
            Backend::Local => {
                let mut destinations = Vec::with_capacity(self.logging.files.len());
                for file in &self.logging.files {
                    destinations.push(Some(open_append(&expand_path(file))?));
                }
                Ok(Logger::local(module, level, self.logging.console, destinations))
            }
            Backend::Cloud => Logger::cloud(&module, level, &CloudOptions::from(&self.cloud)),
            Backend::Discard => Ok(Logger::new(module, level, Box::new(NoopLogSink))),
        }
    }
}

fn open_append(path: &Path) -> Result<Destination, LogError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Box::new(file))
}

/// Expands a leading `~` to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    let home = || {
        std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from)
    };

    if path_str == "~" {
        if let Some(home) = home() {
            return home;
        }
    } else if let Some(rest) = path_str.strip_prefix("~/").or_else(|| path_str.strip_prefix("~\\")) {
        if let Some(home) = home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path_str)
}
