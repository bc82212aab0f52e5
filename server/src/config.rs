use mentoria_core::{get_default_config_file, GeminiConfig, GeminiError, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const APP_NAME: &str = "mentoria";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Location(#[from] GeminiError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub gemini: GeminiConfig,
    pub retry: RetryPolicy,
    /// Chat sessions idle for longer than this are evicted.
    pub session_idle_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            gemini: GeminiConfig::default(),
            retry: RetryPolicy::default(),
            session_idle_timeout_secs: 3600,
        }
    }
}

impl AppConfig {
    /// Reads a TOML file. Gemini settings the file leaves out keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.gemini = GeminiConfig::default().merge(&config.gemini);
        config.session_idle_timeout()?;
        Ok(config)
    }

    /// `~/.config/mentoria/config.toml` when present, otherwise defaults.
    pub fn load_from_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(get_default_config_file(APP_NAME)?)
    }

    /// Fails when the value does not fit a `chrono::Duration`.
    pub fn session_idle_timeout(&self) -> Result<chrono::Duration, ConfigError> {
        i64::try_from(self.session_idle_timeout_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "session_idle_timeout_secs {} is out of range",
                    self.session_idle_timeout_secs
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
http_addr = "0.0.0.0:9000"
session_idle_timeout_secs = 60

[gemini]
model_name = "gemini-2.0-flash"

[retry]
max_attempts = 3
"#
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.http_addr, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.session_idle_timeout_secs, 60);
        assert_eq!(config.gemini.model(), "gemini-2.0-flash");
        assert_eq!(config.gemini.max_output_tokens, Some(8192));
        assert_eq!(config.gemini.api_key, None);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_backoff_ms, 500);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from_file(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http_addr = 42").unwrap();
        let result = AppConfig::load_from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(
            config.session_idle_timeout().unwrap(),
            chrono::Duration::hours(1)
        );
    }

    #[test]
    fn test_out_of_range_idle_timeout_is_an_error() {
        let config: AppConfig =
            toml::from_str("session_idle_timeout_secs = 9223372036854775807").unwrap();
        assert!(matches!(
            config.session_idle_timeout(),
            Err(ConfigError::Invalid(_))
        ));

        let huge = AppConfig {
            session_idle_timeout_secs: u64::MAX,
            ..AppConfig::default()
        };
        assert!(huge.session_idle_timeout().is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "session_idle_timeout_secs = 9223372036854775807").unwrap();
        assert!(matches!(
            AppConfig::load_from_file(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
