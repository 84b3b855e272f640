// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{AppError, Result};

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("newslaunch/", env!("CARGO_PKG_VERSION"));

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::config(format!("HTTP client: {e}")))?;
    Ok(client)
}
