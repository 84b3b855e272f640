// src/lambda/mod.rs

//! AWS Lambda handlers.
//!
//! The producer handler:
//! 1. Reads search parameters from the event (gateway-wrapped or direct)
//! 2. Searches the Guardian Content API
//! 3. Publishes the results to the requested Kinesis stream
//! 4. Answers with a gateway-style `{statusCode, body}` response
//!
//! The consumer handler lives in [`consumer`].

pub mod consumer;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{error, info, instrument, warn};

use crate::error::{AppError, Result};
use crate::models::{AppConfig, SearchParams, SearchResults};
use crate::services::GuardianClient;
use crate::stream::{KinesisSink, RecordSink, StreamWriter, validate_stream_name};
use crate::utils::parse_flag;

/// Producer invocation parameters, after unwrapping any gateway body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerRequest {
    /// Destination stream
    pub stream_name: String,

    /// Search to run; optional fields left unset keep the client defaults
    pub params: SearchParams,
}

impl ProducerRequest {
    /// Extract the request from a Lambda event.
    ///
    /// An event with a `body` field came through the API gateway and its
    /// body is decoded as JSON. Otherwise the event itself holds the fields.
    pub fn from_event(event: &Value) -> Result<Self> {
        let decoded;
        let fields = match event.get("body") {
            Some(Value::String(body)) => {
                decoded = serde_json::from_str::<Value>(body).map_err(|e| {
                    AppError::bad_request(format!("Invalid JSON in request body: {e}"))
                })?;
                &decoded
            }
            Some(body @ Value::Object(_)) => body,
            Some(_) => {
                return Err(AppError::bad_request(
                    "Request body must be a JSON string or object.",
                ));
            }
            None => event,
        };

        let fields = fields
            .as_object()
            .ok_or_else(|| AppError::bad_request("Request parameters must be a JSON object."))?;

        let term = optional_str(fields, "search_term")?.unwrap_or_default();
        let mut params = SearchParams::new(term);
        if let Some(size) = optional_u32(fields, "page_size")? {
            params.page_size = Some(size);
        }
        if let Some(date) = optional_str(fields, "from_date")? {
            params.from_date = Some(date);
        }
        if let Some(value) = present(fields, "filter_response") {
            params.filter_response = parse_flag(value).ok_or_else(|| {
                AppError::validation("filter_response must be true or false.")
            })?;
        }
        if let Some(order) = optional_str(fields, "order_by")? {
            params.order_by = Some(order);
        }
        if let Some(page) = optional_u32(fields, "page")? {
            params.page = Some(page);
        }

        Ok(Self {
            stream_name: optional_str(fields, "stream_name")?.unwrap_or_default(),
            params,
        })
    }
}

/// A field that is present and not null.
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

fn optional_str(fields: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match present(fields, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(AppError::validation(format!("{key} must be a string."))),
    }
}

fn optional_u32(fields: &Map<String, Value>, key: &str) -> Result<Option<u32>> {
    let Some(value) = present(fields, key) else {
        return Ok(None);
    };
    let number = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    number
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| AppError::validation(format!("{key} must be a positive integer.")))
}

/// Gateway-style Lambda response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// JSON-encoded `{"message": ..}` or `{"error": ..}`
    pub body: String,
}

impl ProducerResponse {
    pub fn message(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            body: json!({ "message": message.into() }).to_string(),
        }
    }

    pub fn error(status_code: u16, error: impl Into<String>) -> Self {
        Self {
            status_code,
            body: json!({ "error": error.into() }).to_string(),
        }
    }

    /// Map an error to its response.
    pub fn from_error(err: &AppError) -> Self {
        let text = match err {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Validation(msg) => format!("Input parameter error: {msg}"),
            other => format!("Internal server error: {other}"),
        };
        Self::error(err.status_code(), text)
    }
}

/// Searches and publishes for each producer invocation.
pub struct ProducerHandler<S> {
    search: GuardianClient,
    writer: StreamWriter<S>,
}

impl ProducerHandler<KinesisSink> {
    /// Build the production handler from configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let search = GuardianClient::from_config(&config.guardian)?;
        let sink = KinesisSink::from_config(&config.kinesis).await;
        Ok(Self::new(search, StreamWriter::new(sink)))
    }
}

impl<S: RecordSink> ProducerHandler<S> {
    pub fn new(search: GuardianClient, writer: StreamWriter<S>) -> Self {
        Self { search, writer }
    }

    pub fn writer(&self) -> &StreamWriter<S> {
        &self.writer
    }

    /// Handle one event. Every outcome becomes a response.
    #[instrument(skip_all)]
    pub async fn handle(&self, event: &Value) -> ProducerResponse {
        match self.process(event).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_client_error() {
                    warn!("Rejected request: {}", e);
                } else {
                    error!("Error processing request: {}", e);
                }
                ProducerResponse::from_error(&e)
            }
        }
    }

    async fn process(&self, event: &Value) -> Result<ProducerResponse> {
        let request = ProducerRequest::from_event(event)?;
        validate_stream_name(&request.stream_name)?;

        let term = &request.params.term;
        let Some(results) = self
            .search
            .search(&request.params)
            .await?
            .filter(|results| !results.is_empty())
        else {
            info!("No results for '{}' with provided parameters", term);
            return Ok(ProducerResponse::message(
                204,
                format!("No results for '{term}'"),
            ));
        };

        let stream = &request.stream_name;
        let per_entry = results.len() > 1;
        let acks = match &results {
            SearchResults::Previews(items) => {
                self.writer.send(stream, items, None, per_entry).await?
            }
            SearchResults::Raw(items) => {
                self.writer.send(stream, items, None, per_entry).await?
            }
        };

        info!(
            "Data published to {}: {} results in {} records",
            stream,
            results.len(),
            acks.len()
        );
        Ok(ProducerResponse::message(
            200,
            format!("Data published to {stream}."),
        ))
    }
}

/// Lambda entry point for the producer.
#[cfg(feature = "lambda")]
pub async fn producer_handler<S: RecordSink>(
    handler: &ProducerHandler<S>,
    event: lambda_runtime::LambdaEvent<Value>,
) -> std::result::Result<ProducerResponse, lambda_runtime::Error> {
    let (payload, context) = event.into_parts();
    info!("Handling producer request {}", context.request_id);
    Ok(handler.handle(&payload).await)
}
