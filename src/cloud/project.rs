use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{cloud::metadata::MetadataServer, error::LogError};

/// Resolves the project the cloud sink writes into.
pub trait ProjectResolver {
    /// # Errors
    ///
    /// [`LogError::Identity`] when no ambient identity can be discovered,
    /// [`LogError::ProjectNotFound`] when one is found without a project.
    fn current_project(&self) -> Result<String, LogError>;
}

/// A project chosen by the caller.
#[derive(Debug, Clone)]
pub struct FixedProject(pub String);

impl ProjectResolver for FixedProject {
    fn current_project(&self) -> Result<String, LogError> {
        Ok(self.0.clone())
    }
}

/// Discovers the project the way the platform's default credentials do.
///
/// Sources, in order:
/// 1. `GOOGLE_CLOUD_PROJECT` / `GCLOUD_PROJECT`
/// 2. `project_id` of the file named by `GOOGLE_APPLICATION_CREDENTIALS`
/// 3. `quota_project_id` / `project_id` of the gcloud application default
///    credentials file
/// 4. the metadata server
#[derive(Debug, Clone, Default)]
pub struct AmbientProject {
    pub project_env: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub adc_file: Option<PathBuf>,
    pub metadata: Option<MetadataServer>,
}

#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    quota_project_id: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

fn read_credentials(path: &Path) -> Result<CredentialsFile, LogError> {
    let content = fs::read_to_string(path)
        .map_err(|e| LogError::Identity(format!("reading {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| LogError::Identity(format!("parsing {}: {e}", path.display())))
}

fn well_known_adc_file() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(dir).join("application_default_credentials.json"));
    }
    if cfg!(windows) {
        std::env::var_os("APPDATA")
            .map(|d| PathBuf::from(d).join("gcloud").join("application_default_credentials.json"))
    } else {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join("gcloud")
                .join("application_default_credentials.json")
        })
    }
}

impl AmbientProject {
    /// Reads every source location from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let project_env = ["GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"]
            .iter()
            .find_map(|k| non_empty(std::env::var(k).ok()));
        Self {
            project_env,
            credentials_file: std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            adc_file: well_known_adc_file(),
            metadata: Some(MetadataServer::from_env()),
        }
    }
}

impl ProjectResolver for AmbientProject {
    fn current_project(&self) -> Result<String, LogError> {
        if let Some(project) = non_empty(self.project_env.clone()) {
            return Ok(project);
        }

        let mut identity_found = false;

        // An explicitly named credentials file must be readable
        if let Some(path) = &self.credentials_file {
            let creds = read_credentials(path)?;
            identity_found = true;
            if let Some(project) = non_empty(creds.project_id).or(non_empty(creds.quota_project_id)) {
                return Ok(project);
            }
        }

        if let Some(path) = self.adc_file.as_deref().filter(|p| p.is_file()) {
            let creds = read_credentials(path)?;
            identity_found = true;
            if let Some(project) = non_empty(creds.quota_project_id).or(non_empty(creds.project_id)) {
                return Ok(project);
            }
        }

        if let Some(md) = &self.metadata {
            match md.get("project/project-id") {
                Ok(project) if !project.is_empty() => return Ok(project),
                Ok(_) => return Err(LogError::ProjectNotFound),
                Err(e) if !identity_found => {
                    return Err(LogError::Identity(format!(
                        "no credentials in environment and metadata server unreachable: {e}"
                    )));
                }
                Err(e) => tracing::debug!(error = %e, "metadata server lookup failed"),
            }
        }

        if identity_found {
            Err(LogError::ProjectNotFound)
        } else {
            Err(LogError::Identity("no ambient credentials found".to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::cloud::test_server::{black_hole, serve_once};
    use std::{
        io::Write,
        time::{Duration, Instant},
    };

    fn json_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn env_project_wins() {
        let r = AmbientProject {
            project_env: Some(" env-proj ".into()),
            credentials_file: Some("/does/not/exist.json".into()),
            ..AmbientProject::default()
        };
        assert_eq!(r.current_project().unwrap(), "env-proj");
    }

    #[test]
    fn service_account_file() {
        let f = json_file(r#"{"type":"service_account","project_id":"sa-proj","client_email":"x@y"}"#);
        let r = AmbientProject {
            credentials_file: Some(f.path().to_path_buf()),
            ..AmbientProject::default()
        };
        assert_eq!(r.current_project().unwrap(), "sa-proj");
    }

    #[test]
    fn unreadable_credentials_file_is_identity_error() {
        let r = AmbientProject {
            credentials_file: Some("/does/not/exist.json".into()),
            ..AmbientProject::default()
        };
        assert!(matches!(r.current_project(), Err(LogError::Identity(_))));
    }

    #[test]
    fn adc_file_without_project() {
        let f = json_file(r#"{"type":"authorized_user","client_id":"c"}"#);
        let r = AmbientProject {
            adc_file: Some(f.path().to_path_buf()),
            ..AmbientProject::default()
        };
        assert!(matches!(r.current_project(), Err(LogError::ProjectNotFound)));
    }

    #[test]
    fn adc_file_quota_project() {
        let f = json_file(r#"{"type":"authorized_user","quota_project_id":"quota-proj"}"#);
        let r = AmbientProject {
            adc_file: Some(f.path().to_path_buf()),
            ..AmbientProject::default()
        };
        assert_eq!(r.current_project().unwrap(), "quota-proj");
    }

    #[test]
    fn nothing_found() {
        assert!(matches!(
            AmbientProject::default().current_project(),
            Err(LogError::Identity(_))
        ));
    }

    #[test]
    fn metadata_server_fallback() {
        let (port, server) = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 7\r\n\r\nmd-proj");
        let r = AmbientProject {
            metadata: Some(MetadataServer::new("127.0.0.1", port)),
            ..AmbientProject::default()
        };
        assert_eq!(r.current_project().unwrap(), "md-proj");
        server.join().unwrap();
    }

    #[test]
    fn unanswered_metadata_lookup_fails_with_identity() {
        let (port, _listener) = black_hole();
        let r = AmbientProject {
            metadata: Some(MetadataServer::new("127.0.0.1", port).with_timeout(Duration::from_millis(200))),
            ..AmbientProject::default()
        };

        let started = Instant::now();
        assert!(matches!(r.current_project(), Err(LogError::Identity(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn fixed_project() {
        assert_eq!(FixedProject("p".into()).current_project().unwrap(), "p");
    }
}
