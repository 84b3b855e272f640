//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::mask_secret;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Guardian Content API settings
    #[serde(default)]
    pub guardian: GuardianConfig,

    /// Kinesis stream service settings
    #[serde(default)]
    pub kinesis: KinesisConfig,

    /// Log verbosity
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.guardian.api_url.trim().is_empty() {
            return Err(AppError::config("guardian.api_url is empty"));
        }
        if self.guardian.request_timeout_secs == 0 {
            return Err(AppError::config(
                "guardian.request_timeout_secs must be > 0",
            ));
        }
        if self.kinesis.region.trim().is_empty() {
            return Err(AppError::config("kinesis.region is empty"));
        }
        if self.kinesis.timeout_secs == 0 {
            return Err(AppError::config("kinesis.timeout_secs must be > 0"));
        }
        if self.kinesis.access_key_id.is_some() != self.kinesis.secret_access_key.is_some() {
            return Err(AppError::config(
                "kinesis.access_key_id and kinesis.secret_access_key must be set together",
            ));
        }
        Ok(())
    }

    /// Copy of the configuration with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.guardian.api_key = config.guardian.api_key.as_deref().map(mask_secret);
        config.kinesis.access_key_id = config.kinesis.access_key_id.as_deref().map(mask_secret);
        config.kinesis.secret_access_key =
            config.kinesis.secret_access_key.as_deref().map(mask_secret);
        config
    }
}

/// Guardian Content API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianConfig {
    /// API key; falls back to `GUARDIAN_API_KEY` when unset
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the Content API
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: defaults::api_url(),
            request_timeout_secs: defaults::request_timeout(),
        }
    }
}

/// Kinesis client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinesisConfig {
    /// AWS region of the stream
    #[serde(default = "defaults::region")]
    pub region: String,

    /// Static credentials; the default AWS provider chain is used when unset
    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Endpoint override, e.g. a local Kinesis emulator
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Per-operation timeout in seconds
    #[serde(default = "defaults::stream_timeout")]
    pub timeout_secs: u64,
}

impl Default for KinesisConfig {
    fn default() -> Self {
        Self {
            region: defaults::region(),
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
            timeout_secs: defaults::stream_timeout(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of debug, info, warn(ing), error, critical
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn api_url() -> String {
        "https://content.guardianapis.com".into()
    }
    pub fn request_timeout() -> u64 {
        10
    }
    pub fn region() -> String {
        "eu-west-2".into()
    }
    pub fn stream_timeout() -> u64 {
        10
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.guardian.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.kinesis.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_half_credentials() {
        let mut config = AppConfig::default();
        config.kinesis.access_key_id = Some("AKIAEXAMPLE".to_string());
        assert!(config.validate().is_err());

        config.kinesis.secret_access_key = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_errors_are_config_errors() {
        let mut config = AppConfig::default();
        config.kinesis.region = " ".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [guardian]
            api_key = "abc123"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.guardian.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.guardian.api_url, "https://content.guardianapis.com");
        assert_eq!(config.guardian.request_timeout_secs, 10);
        assert_eq!(config.kinesis.region, "eu-west-2");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn redacted_masks_secrets() {
        let mut config = AppConfig::default();
        config.guardian.api_key = Some("abcdef123456".to_string());
        config.kinesis.secret_access_key = Some("topsecretvalue".to_string());

        let redacted = config.redacted();
        let key = redacted.guardian.api_key.unwrap();
        assert!(!key.contains("123456"));
        assert!(!redacted.kinesis.secret_access_key.unwrap().contains("secret"));
        assert_eq!(redacted.kinesis.region, config.kinesis.region);
    }
}
