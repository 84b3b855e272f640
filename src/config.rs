// src/config.rs

//! Configuration loading utilities.
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. The TOML defaults file (`newslaunch.toml`, or `NEWSLAUNCH_CONFIG`)
//! 3. Process environment, after a local `.env` has been loaded
//! 4. Explicit overrides applied by the caller (CLI flags)

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::AppConfig;

/// Defaults file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "newslaunch.toml";

/// Environment variables read by [`apply_env_overrides`].
pub mod env {
    pub const CONFIG_PATH: &str = "NEWSLAUNCH_CONFIG";
    pub const GUARDIAN_API_KEY: &str = "GUARDIAN_API_KEY";
    pub const GUARDIAN_API_URL: &str = "GUARDIAN_API_URL";
    pub const HTTP_REQ_TIMEOUT: &str = "HTTP_REQ_TIMEOUT";
    pub const KINESIS_REGION_NAME: &str = "KINESIS_REGION_NAME";
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    pub const KINESIS_ENDPOINT_URL: &str = "KINESIS_ENDPOINT_URL";
    pub const KINESIS_TIMEOUT_SECS: &str = "KINESIS_TIMEOUT_SECS";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

/// Load the layered configuration.
///
/// An explicit `path` must exist. Without one, `NEWSLAUNCH_CONFIG` or
/// `newslaunch.toml` is read when present and built-in defaults are used
/// otherwise. A config file that does not parse is always an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    // Real environment variables take precedence over .env entries.
    if let Ok(dotenv) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", dotenv.display());
    }

    let mut config = match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            AppConfig::load(path).map_err(|e| {
                AppError::config(format!("Failed to load {}: {e}", path.display()))
            })?
        }
        None => {
            let path = std::env::var(env::CONFIG_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
            load_defaults_file(&path)?
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Read the defaults file at `path`, or built-in defaults when it is absent.
///
/// A file that exists but does not parse is an error.
fn load_defaults_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    AppConfig::load(path)
        .map_err(|e| AppError::config(format!("Failed to load {}: {e}", path.display())))
}

/// Apply environment overrides through `lookup`.
///
/// Empty values are ignored, as are numbers that do not parse.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let get_secs = |key: &str| {
        get(key).and_then(|v| match v.trim().parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(_) => {
                warn!("Ignoring {key}={v:?}: expected a whole number of seconds");
                None
            }
        })
    };

    if let Some(key) = get(env::GUARDIAN_API_KEY) {
        config.guardian.api_key = Some(key);
    }
    if let Some(url) = get(env::GUARDIAN_API_URL) {
        config.guardian.api_url = url;
    }
    if let Some(secs) = get_secs(env::HTTP_REQ_TIMEOUT) {
        config.guardian.request_timeout_secs = secs;
    }
    if let Some(region) = get(env::KINESIS_REGION_NAME) {
        config.kinesis.region = region;
    }
    if let Some(id) = get(env::AWS_ACCESS_KEY_ID) {
        config.kinesis.access_key_id = Some(id);
    }
    if let Some(secret) = get(env::AWS_SECRET_ACCESS_KEY) {
        config.kinesis.secret_access_key = Some(secret);
    }
    if let Some(endpoint) = get(env::KINESIS_ENDPOINT_URL) {
        config.kinesis.endpoint_url = Some(endpoint);
    }
    if let Some(secs) = get_secs(env::KINESIS_TIMEOUT_SECS) {
        config.kinesis.timeout_secs = secs;
    }
    if let Some(level) = get(env::LOG_LEVEL) {
        config.logging.level = level;
    }
}
