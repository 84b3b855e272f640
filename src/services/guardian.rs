// src/services/guardian.rs

//! Guardian Content API search client.
//!
//! Validates search parameters, queries `/search`, and maps the raw results
//! to [`ArticlePreview`]s.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::{ArticlePreview, GuardianConfig, SearchParams, SearchResults};
use crate::utils::http::create_async_client;

/// Production Content API base URL.
pub const API_URL: &str = "https://content.guardianapis.com";

/// Environment variable consulted when no API key is given.
pub const API_KEY_ENV: &str = "GUARDIAN_API_KEY";

const SERVICE: &str = "guardian";

/// Client for the Guardian Content API.
#[derive(Debug, Clone)]
pub struct GuardianClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GuardianClient {
    /// Create a client against the production API.
    ///
    /// Uses `api_key` when given and non-empty, otherwise `GUARDIAN_API_KEY`.
    pub fn new(api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let api_key = resolve_api_key(api_key, |key| std::env::var(key).ok())?;
        Ok(Self {
            client: create_async_client(timeout)?,
            api_key,
            base_url: API_URL.to_string(),
        })
    }

    /// Create a client from the `[guardian]` configuration section.
    pub fn from_config(config: &GuardianConfig) -> Result<Self> {
        let client = Self::new(
            config.api_key.as_deref(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(client.with_base_url(&config.api_url))
    }

    /// Point the client at another base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Search for articles.
    ///
    /// Returns `Ok(None)` when the API reports no results. Parameters are
    /// validated before any request is made.
    pub async fn search(&self, params: &SearchParams) -> Result<Option<SearchResults>> {
        let mut query = params.to_query()?;
        debug!(?query, "Searching Guardian articles");
        query.push(("api-key", self.api_key.clone()));

        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                // The request URL carries the API key.
                AppError::upstream(
                    SERVICE,
                    format!("Error fetching Guardian articles: {}", e.without_url()),
                )
            })?;

        let body = response.text().await.map_err(|e| {
            AppError::upstream(
                SERVICE,
                format!("Error reading Guardian response: {}", e.without_url()),
            )
        })?;

        let Some(results) = extract_results(&body)? else {
            info!("No results for '{}'", params.term);
            return Ok(None);
        };

        info!("Found {} results for '{}'", results.len(), params.term);

        if params.filter_response {
            Ok(Some(SearchResults::Previews(filter_articles(&results)?)))
        } else {
            Ok(Some(SearchResults::Raw(results)))
        }
    }
}

/// Resolve the API key from an explicit value or the environment.
fn resolve_api_key<F>(explicit: Option<&str>, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .map(str::to_string)
        .filter(|key| !key.is_empty())
        .or_else(|| lookup(API_KEY_ENV).filter(|key| !key.is_empty()))
        .ok_or_else(|| {
            AppError::config(format!(
                "API key is required. Please provide it or set the '{API_KEY_ENV}' environment variable."
            ))
        })
}

/// Pull `response.results` out of a search response body.
fn extract_results(body: &str) -> Result<Option<Vec<Value>>> {
    let data: Value = serde_json::from_str(body).map_err(|e| {
        AppError::upstream(SERVICE, format!("Invalid JSON in search response: {e}"))
    })?;

    match data.pointer("/response/results") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(results)) if results.is_empty() => Ok(None),
        Some(Value::Array(results)) => Ok(Some(results.clone())),
        Some(other) => Err(AppError::upstream(
            SERVICE,
            format!("Unexpected type for response.results: {other}"),
        )),
    }
}

/// Map raw results to previews; one malformed result fails the batch.
fn filter_articles(results: &[Value]) -> Result<Vec<ArticlePreview>> {
    results.iter().map(ArticlePreview::from_raw).collect()
}
