//! Configuration for reposcore
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `REPOSCORE_*` environment variables (nested keys use `__`, e.g.
//! `REPOSCORE_GATEWAY__MODEL`). The model credential is read separately
//! from `OPENAI_API_KEY`; its presence is the switch between the live and
//! the disabled gateway.

use crate::error::Result;
use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the model backend credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_EVALUATION_TIMEOUT_SECS: u64 = 90;

/// Get the default database path using XDG_DATA_HOME standard
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reposcore")
        .join("reposcore.db")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub addr: String,
}

/// Live gateway tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl GatewaySettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// Ceiling the orchestrator applies around each gateway call
    pub timeout_secs: u64,
}

impl EvaluationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Effective process configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub database_path: String,
    pub server: ServerSettings,
    pub gateway: GatewaySettings,
    pub evaluation: EvaluationSettings,

    /// Model credential; never serialized
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_db_path().to_string_lossy().to_string(),
            server: ServerSettings {
                addr: DEFAULT_SERVER_ADDR.to_string(),
            },
            gateway: GatewaySettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                model: DEFAULT_MODEL.to_string(),
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            evaluation: EvaluationSettings {
                timeout_secs: DEFAULT_EVALUATION_TIMEOUT_SECS,
            },
            api_key: None,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("database_path", defaults.database_path)?
            .set_default("server.addr", defaults.server.addr)?
            .set_default("gateway.base_url", defaults.gateway.base_url)?
            .set_default("gateway.model", defaults.gateway.model)?
            .set_default(
                "gateway.request_timeout_secs",
                defaults.gateway.request_timeout_secs as i64,
            )?
            .set_default(
                "evaluation.timeout_secs",
                defaults.evaluation.timeout_secs as i64,
            )?;

        if let Some(path) = file {
            debug!("Loading configuration file: {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("REPOSCORE")
                .prefix_separator("_")
                .separator("__"),
        );

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.api_key = api_key_from_env();
        Ok(settings)
    }

    /// Whether a model credential is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Read the credential, treating blank values as absent
pub fn api_key_from_env() -> Option<SecretString> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_defaults_without_environment() {
        env::remove_var(API_KEY_ENV);
        env::remove_var("REPOSCORE_GATEWAY__MODEL");

        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.server.addr, DEFAULT_SERVER_ADDR);
        assert_eq!(settings.gateway.model, DEFAULT_MODEL);
        assert_eq!(settings.evaluation.timeout(), Duration::from_secs(90));
        assert!(!settings.has_api_key());
    }

    #[test]
    #[serial]
    fn test_environment_overrides_nested_keys() {
        env::set_var("REPOSCORE_GATEWAY__MODEL", "gpt-test");
        env::set_var("REPOSCORE_DATABASE_PATH", "/tmp/reposcore-env.db");

        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.gateway.model, "gpt-test");
        assert_eq!(settings.database_path, "/tmp/reposcore-env.db");

        env::remove_var("REPOSCORE_GATEWAY__MODEL");
        env::remove_var("REPOSCORE_DATABASE_PATH");
    }

    #[test]
    #[serial]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reposcore.toml");
        std::fs::write(
            &path,
            "database_path = \"/tmp/from-file.db\"\n[server]\naddr = \"0.0.0.0:9000\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.database_path, "/tmp/from-file.db");
        assert_eq!(settings.server.addr, "0.0.0.0:9000");
        assert_eq!(settings.gateway.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    #[serial]
    fn test_api_key_presence() {
        env::set_var(API_KEY_ENV, "sk-test-123");
        let key = api_key_from_env().unwrap();
        assert_eq!(key.expose_secret(), "sk-test-123");

        env::set_var(API_KEY_ENV, "   ");
        assert!(api_key_from_env().is_none());

        env::remove_var(API_KEY_ENV);
        assert!(api_key_from_env().is_none());
    }

    #[test]
    #[serial]
    fn test_api_key_not_serialized_or_logged() {
        env::set_var(API_KEY_ENV, "sk-secret-value");
        let settings = Settings::load(None).unwrap();
        env::remove_var(API_KEY_ENV);

        let rendered = toml::to_string(&settings).unwrap();
        assert!(!rendered.contains("sk-secret-value"));
        assert!(!format!("{:?}", settings).contains("sk-secret-value"));
    }
}
