//! Backend connection settings
//!
//! Sources are merged in precedence order, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `fieldreg.toml`, `fieldreg.yaml` or `fieldreg.json` in the working directory
//! 3. An explicitly named file (`--config`)
//! 4. `FIELDREG_*` environment variables, e.g. `FIELDREG_BASE_URL`

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

/// File stems searched for in the working directory
const CONFIG_STEM: &str = "fieldreg";

/// Environment variable prefix
const ENV_PREFIX: &str = "FIELDREG_";

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse configuration: {source}")]
    Parse {
        #[from]
        source: figment::Error,
    },

    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("Unable to determine current directory")]
    CurrentDirectory(#[source] std::io::Error),
}

/// Where and how to reach the registry server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// API root, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
            token: None,
        }
    }
}

impl BackendConfig {
    /// Load settings relative to the current directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDirectory)?;
        Self::load_in(&cwd, explicit)
    }

    /// Load settings, searching `dir` for project config files.
    pub fn load_in(dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        for (ext, _) in FORMATS {
            let candidate = dir.join(format!("{CONFIG_STEM}.{ext}"));
            if candidate.is_file() {
                trace!("Loading config file: {}", candidate.display());
                figment = figment.merge(file_provider(&candidate)?);
            }
        }

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            debug!("Loading explicit config file: {}", path.display());
            figment = figment.merge(file_provider(path)?);
        }

        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        debug!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "loaded backend config");
        Ok(config)
    }

    /// Check the URL is absolute http(s) and the timeout is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "base_url",
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "base_url",
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Copy)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

const FORMATS: &[(&str, FileFormat)] = &[
    ("toml", FileFormat::Toml),
    ("yaml", FileFormat::Yaml),
    ("yml", FileFormat::Yaml),
    ("json", FileFormat::Json),
];

fn file_provider(path: &Path) -> Result<Figment, ConfigError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let format = FORMATS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, f)| *f)
        .ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
    Ok(match format {
        FileFormat::Toml => Figment::from(Toml::file(path)),
        FileFormat::Yaml => Figment::from(Yaml::file(path)),
        FileFormat::Json => Figment::from(Json::file(path)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = BackendConfig::load_in(dir.path(), None).unwrap();
        assert_eq!(config, BackendConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_project_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("fieldreg.toml"),
            "base_url = \"https://erp.example.com/api\"\n",
        )
        .unwrap();
        let config = BackendConfig::load_in(dir.path(), None).unwrap();
        assert_eq!(config.base_url, "https://erp.example.com/api");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    #[serial]
    fn test_explicit_file_wins_over_project_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("fieldreg.yaml"),
            "base_url: https://one.example.com/api\ntimeout_secs: 5\n",
        )
        .unwrap();
        let explicit = dir.path().join("override.json");
        fs::write(&explicit, r#"{"base_url": "https://two.example.com/api"}"#).unwrap();

        let config = BackendConfig::load_in(dir.path(), Some(&explicit)).unwrap();
        assert_eq!(config.base_url, "https://two.example.com/api");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    #[serial]
    fn test_env_overrides_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fieldreg.toml"), "timeout_secs = 5\n").unwrap();
        std::env::set_var("FIELDREG_TIMEOUT_SECS", "9");
        std::env::set_var("FIELDREG_TOKEN", "secret");
        let result = BackendConfig::load_in(dir.path(), None);
        std::env::remove_var("FIELDREG_TIMEOUT_SECS");
        std::env::remove_var("FIELDREG_TOKEN");

        let config = result.unwrap();
        assert_eq!(config.timeout_secs, 9);
        assert_eq!(config.token.as_deref(), Some("secret"));
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = BackendConfig::load_in(dir.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let ini = dir.path().join("settings.ini");
        fs::write(&ini, "base_url=x").unwrap();
        let err = BackendConfig::load_in(dir.path(), Some(&ini)).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = BackendConfig {
            base_url: "ftp://files.example.com".into(),
            ..BackendConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "base_url", .. })
        ));

        config.base_url = "not a url".into();
        assert!(config.validate().is_err());

        config.base_url = "http://localhost:8000/api".into();
        config.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "timeout_secs", .. })
        ));
    }
}
