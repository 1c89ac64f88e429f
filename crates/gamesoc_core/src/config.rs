//! Application configuration.
//!
//! # Responsibility
//! - Load settings from a TOML file with a default for every field.
//! - Apply `GAMESOC_*` environment overrides for deployment secrets.
//! - Reject settings that would only fail later at first use.
//!
//! # Invariants
//! - A config returned by `load`/`from_toml_str` has passed `validate`.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use url::Url;

pub const ENV_DISPATCH_ENDPOINT: &str = "GAMESOC_DISPATCH_ENDPOINT";
pub const ENV_DISPATCH_TOKEN: &str = "GAMESOC_DISPATCH_TOKEN";

const DEFAULT_DATABASE_PATH: &str = "gamesoc.sqlite3";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration load/validation failures.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Outbound message service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchSettings {
    /// Batch send endpoint. Dispatch is unavailable when unset.
    pub endpoint: Option<String>,
    pub api_token: Option<String>,
    /// Transport timeout for the single batch request.
    pub timeout_secs: u64,
    pub reply_to: Option<String>,
    pub sender_name: Option<String>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            reply_to: None,
            sender_name: None,
        }
    }
}

/// Top-level application settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub dispatch: DispatchSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            dispatch: DispatchSettings::default(),
        }
    }
}

impl AppConfig {
    /// Reads a TOML file, applies process environment overrides, validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML text without consulting the environment.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides dispatch secrets from `lookup` (normally the environment).
    ///
    /// Blank values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(endpoint) = non_blank(ENV_DISPATCH_ENDPOINT) {
            self.dispatch.endpoint = Some(endpoint);
        }
        if let Some(token) = non_blank(ENV_DISPATCH_TOKEN) {
            self.dispatch.api_token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path must not be empty".into()));
        }
        if !matches!(
            self.log_level.trim().to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "warning" | "error"
        ) {
            return Err(ConfigError::Invalid(format!(
                "unsupported log_level `{}`",
                self.log_level
            )));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        if self.dispatch.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "dispatch.timeout_secs must be greater than zero".into(),
            ));
        }
        if let Some(endpoint) = &self.dispatch.endpoint {
            let url = Url::parse(endpoint).map_err(|err| {
                ConfigError::Invalid(format!("dispatch.endpoint `{endpoint}`: {err}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "dispatch.endpoint must use http or https, got `{}`",
                    url.scheme()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_DISPATCH_ENDPOINT, ENV_DISPATCH_TOKEN};
    use std::path::PathBuf;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.dispatch.timeout_secs, 30);
    }

    #[test]
    fn parses_nested_dispatch_table() {
        let config = AppConfig::from_toml_str(
            r#"
            database_path = "/var/lib/gamesoc/data.sqlite3"
            log_level = "warn"

            [dispatch]
            endpoint = "https://mail.example.org/api/send"
            timeout_secs = 10
            sender_name = "Gaming Society"
            "#,
        )
        .expect("config should parse");
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/gamesoc/data.sqlite3")
        );
        assert_eq!(config.dispatch.timeout_secs, 10);
        assert_eq!(config.dispatch.sender_name.as_deref(), Some("Gaming Society"));
    }

    #[test]
    fn rejects_non_http_endpoint_and_zero_timeout() {
        let err = AppConfig::from_toml_str("[dispatch]\nendpoint = \"ftp://x.org\"\n")
            .expect_err("ftp endpoint must be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AppConfig::from_toml_str("[dispatch]\ntimeout_secs = 0\n")
            .expect_err("zero timeout must be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = AppConfig::from_toml_str("databse_path = \"x\"\n").expect_err("typo key");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_replace_secrets_but_skip_blank_values() {
        let mut config = AppConfig::default();
        config.dispatch.api_token = Some("file-token".into());
        config.apply_env_overrides(|key| match key {
            ENV_DISPATCH_ENDPOINT => Some("https://override.example.org".into()),
            ENV_DISPATCH_TOKEN => Some("   ".into()),
            _ => None,
        });
        assert_eq!(
            config.dispatch.endpoint.as_deref(),
            Some("https://override.example.org")
        );
        assert_eq!(config.dispatch.api_token.as_deref(), Some("file-token"));
    }
}
