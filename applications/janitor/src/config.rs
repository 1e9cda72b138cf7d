/// Janitor configuration
use crate::error::{JanitorError, Result};
use port_client::{Credentials, DEFAULT_API_URL};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use user_cleanup::{DEFAULT_BACKUP_DIR, DEFAULT_THRESHOLD_DAYS};

/// Prefix of every environment variable the janitor reads.
pub const ENV_PREFIX: &str = "PORT";

/// Settings read once at startup from `PORT_*` environment variables.
#[derive(Clone, Deserialize)]
pub struct JanitorConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_threshold_days")]
    pub threshold_days: u32,

    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
}

impl JanitorConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from an explicit variable map instead of the
    /// process environment. Keys are full variable names (`PORT_CLIENT_ID`).
    pub fn from_env_map(vars: config::Map<String, String>) -> Result<Self> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    // Values stay strings; `threshold_days` is converted on deserialize
    fn from_environment(environment: config::Environment) -> Result<Self> {
        let settings = config::Config::builder().add_source(environment).build()?;

        let mut config: Self = settings.try_deserialize()?;
        if config.api_url.trim().is_empty() {
            config.api_url = default_api_url();
        }
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.client_id.trim().is_empty() {
            missing.push("PORT_CLIENT_ID");
        }
        if self.client_secret.trim().is_empty() {
            missing.push("PORT_CLIENT_SECRET");
        }
        if !missing.is_empty() {
            return Err(JanitorError::MissingCredentials(missing));
        }

        if self.backup_dir.as_os_str().is_empty() {
            return Err(JanitorError::Config(
                "Backup directory must not be empty (set PORT_BACKUP_DIR)".to_string(),
            ));
        }

        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.client_id.clone(), self.client_secret.clone())
    }
}

impl fmt::Debug for JanitorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JanitorConfig")
            .field("client_id", &self.credentials().hint())
            .field("client_secret", &"***")
            .field("api_url", &self.api_url)
            .field("threshold_days", &self.threshold_days)
            .field("backup_dir", &self.backup_dir)
            .finish()
    }
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_url: default_api_url(),
            threshold_days: default_threshold_days(),
            backup_dir: default_backup_dir(),
        }
    }
}

/// Where the credentials in effect came from.
///
/// `.env` never overrides variables already set in the process environment,
/// so a present `.env` can be shadowed by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Set in the process environment before `.env` was read
    Environment { dotenv_shadowed: bool },
    /// Supplied by the `.env` file
    DotEnv,
    /// Not set anywhere
    Missing,
}

impl CredentialSource {
    /// Work out the source from whether the credentials were already in the
    /// environment before `.env` was loaded, and whether they are set now.
    pub fn detect(set_before_dotenv: bool, dotenv: Option<&Path>, set_now: bool) -> Self {
        match (set_before_dotenv, set_now) {
            (true, _) => CredentialSource::Environment {
                dotenv_shadowed: dotenv.is_some(),
            },
            (false, true) if dotenv.is_some() => CredentialSource::DotEnv,
            _ => CredentialSource::Missing,
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment { .. } => write!(f, "environment variables"),
            CredentialSource::DotEnv => write!(f, ".env file"),
            CredentialSource::Missing => write!(f, "not set"),
        }
    }
}

/// Whether both credential variables are set and non-empty.
pub fn credentials_in_env() -> bool {
    ["PORT_CLIENT_ID", "PORT_CLIENT_SECRET"]
        .iter()
        .all(|name| std::env::var(name).is_ok_and(|v| !v.trim().is_empty()))
}

// Default values
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_threshold_days() -> u32 {
    DEFAULT_THRESHOLD_DAYS
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BACKUP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secret() {
        let config = JanitorConfig {
            client_id: "abcdefghijkl".to_string(),
            client_secret: "top-secret-value".to_string(),
            ..JanitorConfig::default()
        };

        let debug = format!("{:?}", config);
        assert!(debug.contains("abcdefgh..."));
        assert!(!debug.contains("ijkl"));
        assert!(!debug.contains("top-secret-value"));
    }

    #[test]
    fn test_credential_source_detection() {
        let dotenv = Path::new("/work/.env");

        assert_eq!(
            CredentialSource::detect(true, Some(dotenv), true),
            CredentialSource::Environment {
                dotenv_shadowed: true
            }
        );
        assert_eq!(
            CredentialSource::detect(true, None, true),
            CredentialSource::Environment {
                dotenv_shadowed: false
            }
        );
        assert_eq!(
            CredentialSource::detect(false, Some(dotenv), true),
            CredentialSource::DotEnv
        );
        assert_eq!(
            CredentialSource::detect(false, Some(dotenv), false),
            CredentialSource::Missing
        );
        assert_eq!(
            CredentialSource::detect(false, None, false),
            CredentialSource::Missing
        );
    }
}
