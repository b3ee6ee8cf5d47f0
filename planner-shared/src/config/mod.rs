//! # Configuration
//!
//! Client configuration: where the backend lives, how sessions are
//! authenticated and persisted, and how chatty logging is.
//!
//! Values resolve in layers. Defaults come first, then an optional
//! configuration file (YAML, JSON or TOML), then `PLANNER_*` environment
//! variables for anything the file left at its default, then explicit
//! overrides from the command line.

use crate::models::AuthScheme;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

/// Backend base URL.
pub const ENV_API_URL: &str = "PLANNER_API_URL";
/// `basic` or `bearer`.
pub const ENV_AUTH_SCHEME: &str = "PLANNER_AUTH_SCHEME";
/// Log level used when `RUST_LOG` is unset.
pub const ENV_LOG_LEVEL: &str = "PLANNER_LOG_LEVEL";
/// Session file location.
pub const ENV_SESSION_PATH: &str = "PLANNER_SESSION_PATH";
/// Per-request timeout in whole seconds.
pub const ENV_REQUEST_TIMEOUT: &str = "PLANNER_REQUEST_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SESSION_FILE: &str = "session.json";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid for its format.
    #[error("failed to parse config file {path}: {message}")]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The file extension is not yaml, yml, json or toml.
    #[error("unsupported configuration format '{0}'; use yaml, json or toml")]
    UnsupportedFormat(String),

    /// An environment variable holds a value that cannot be parsed.
    #[error("invalid {var} value '{value}': {message}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value found.
        value: String,
        /// Why it was rejected.
        message: String,
    },

    /// The resolved configuration failed validation. One message per problem.
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Settings supplied on the command line. They win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--api-url`
    pub api_url: Option<String>,
    /// `--auth-scheme`
    pub auth_scheme: Option<AuthScheme>,
    /// `--log-level`
    pub log_level: Option<String>,
    /// `--session-file`
    pub session_path: Option<PathBuf>,
}

/// Resolved client configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST backend, including the `/api` prefix.
    pub api_url: String,

    /// Scheme used for credentials created by new logins.
    pub auth_scheme: AuthScheme,

    /// Logging level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Where the session is persisted. `None` means the per-user config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_path: Option<PathBuf>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_scheme: AuthScheme::Basic,
            log_level: "info".to_string(),
            session_path: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Loads the configuration from a file, environment variables, and overrides.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or parsed, an
    /// environment variable is malformed, or the result fails validation.
    pub fn load_config(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, overrides, |var| env::var(var).ok())
    }

    /// [`ClientConfig::load_config`] reading variables through `lookup`.
    fn load_with_env(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => {
                let config = Self::from_file(path)?;
                tracing::debug!(path = %path.display(), "loaded configuration file");
                config
            }
            None => Self::with_defaults(),
        };

        config.apply_env(lookup)?;

        if let Some(api_url) = &overrides.api_url {
            config.api_url.clone_from(api_url);
        }
        if let Some(scheme) = overrides.auth_scheme {
            config.auth_scheme = scheme;
        }
        if let Some(level) = &overrides.log_level {
            config.log_level.clone_from(level);
        }
        if let Some(path) = &overrides.session_path {
            config.session_path = Some(path.clone());
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => {
                serde_yml::from_str(&content).map_err(|e| parse_error(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
            Some("toml") => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Environment variables apply only to values still at their default.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let defaults = Self::with_defaults();

        if self.api_url == defaults.api_url {
            if let Some(url) = lookup(ENV_API_URL) {
                self.api_url = url;
            }
        }
        if self.auth_scheme == defaults.auth_scheme {
            if let Some(raw) = lookup(ENV_AUTH_SCHEME) {
                self.auth_scheme = raw.parse().map_err(|message| ConfigError::InvalidEnv {
                    var: ENV_AUTH_SCHEME,
                    value: raw.clone(),
                    message,
                })?;
            }
        }
        if self.log_level == defaults.log_level {
            if let Some(level) = lookup(ENV_LOG_LEVEL) {
                self.log_level = level;
            }
        }
        if self.session_path.is_none() {
            if let Some(path) = lookup(ENV_SESSION_PATH) {
                self.session_path = Some(PathBuf::from(path));
            }
        }
        if self.request_timeout_secs == defaults.request_timeout_secs {
            if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
                self.request_timeout_secs =
                    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                        var: ENV_REQUEST_TIMEOUT,
                        value: raw.clone(),
                        message: "must be a whole number of seconds".to_string(),
                    })?;
            }
        }
        Ok(())
    }

    /// Checks every setting, collecting all problems.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] listing each problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        match Url::parse(&self.api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "api_url must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => errors.push(format!("api_url '{}' is not a valid URL: {e}", self.api_url)),
        }

        if self.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be greater than 0".to_string());
        }

        if self.log_level.trim().is_empty() {
            errors.push("log_level must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// [`ClientConfig::request_timeout_secs`] as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session file location, falling back to the per-user config directory.
    #[must_use]
    pub fn session_file(&self) -> Option<PathBuf> {
        self.session_path.clone().or_else(default_session_path)
    }
}

/// `<config dir>/planner/session.json`, when a home directory is known.
#[must_use]
pub fn default_session_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.config_dir().join("planner").join(SESSION_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn load(
        path: Option<&Path>,
        overrides: &ConfigOverrides,
        vars: &[(&str, &str)],
    ) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::load_with_env(path, overrides, |var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(None, &ConfigOverrides::default(), &[]).unwrap();
        assert_eq!(config, ClientConfig::with_defaults());
        assert_eq!(config.api_url, "http://localhost:8080/api");
        assert_eq!(config.auth_scheme, AuthScheme::Basic);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_yaml_file_with_partial_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planner.yaml");
        fs::write(&path, "api_url: https://planner.example/api\nauth_scheme: bearer\n").unwrap();

        let config = load(Some(&path), &ConfigOverrides::default(), &[]).unwrap();
        assert_eq!(config.api_url, "https://planner.example/api");
        assert_eq!(config.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_json_and_toml_files() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("planner.json");
        fs::write(&json, r#"{"request_timeout_secs": 5}"#).unwrap();
        let config = load(Some(&json), &ConfigOverrides::default(), &[]).unwrap();
        assert_eq!(config.request_timeout_secs, 5);

        let toml_path = dir.path().join("planner.toml");
        fs::write(&toml_path, "log_level = \"debug\"\n").unwrap();
        let config = load(Some(&toml_path), &ConfigOverrides::default(), &[]).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planner.ini");
        fs::write(&path, "api_url=x").unwrap();
        let err = load(Some(&path), &ConfigOverrides::default(), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "ini"));
    }

    #[test]
    fn test_env_does_not_override_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planner.yaml");
        fs::write(&path, "api_url: https://from-file.example/api\n").unwrap();
        let vars = [
            (ENV_API_URL, "https://from-env.example/api"),
            (ENV_LOG_LEVEL, "trace"),
        ];

        let config = load(Some(&path), &ConfigOverrides::default(), &vars).unwrap();
        assert_eq!(config.api_url, "https://from-file.example/api");
        assert_eq!(config.log_level, "trace");
    }

    #[test]
    fn test_overrides_win_over_env() {
        let vars = [
            (ENV_API_URL, "https://from-env.example/api"),
            (ENV_AUTH_SCHEME, "bearer"),
            (ENV_LOG_LEVEL, "warn"),
        ];
        let overrides = ConfigOverrides {
            api_url: Some("http://127.0.0.1:9000/api".to_string()),
            log_level: Some("debug".to_string()),
            session_path: Some(PathBuf::from("/tmp/s.json")),
            ..ConfigOverrides::default()
        };
        let config = load(None, &overrides, &vars).unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.session_file(), Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn test_invalid_env_values() {
        let err = load(None, &ConfigOverrides::default(), &[(ENV_REQUEST_TIMEOUT, "soon")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var, .. } if var == ENV_REQUEST_TIMEOUT));

        let err = load(None, &ConfigOverrides::default(), &[(ENV_AUTH_SCHEME, "digest")])
            .unwrap_err();
        assert!(err.to_string().contains("digest"));
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let config = ClientConfig {
            api_url: "ftp://files.example".to_string(),
            request_timeout_secs: 0,
            ..ClientConfig::with_defaults()
        };
        match config.validate().unwrap_err() {
            ConfigError::Invalid(problems) => {
                assert_eq!(problems.len(), 2);
                assert!(problems[0].contains("http or https"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
