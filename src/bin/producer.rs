//! AWS Lambda entry point for the newslaunch producer.
//!
//! Deploy with `cargo lambda build --release --features lambda`.
//!
//! ## Environment Variables
//!
//! - `GUARDIAN_API_KEY`: Content API key (required)
//! - `KINESIS_REGION_NAME`: Region of the destination stream (default: `eu-west-2`)
//! - `HTTP_REQ_TIMEOUT`: Search request timeout in seconds
//! - `KINESIS_TIMEOUT_SECS`: Stream write timeout in seconds
//! - `LOG_LEVEL` / `RUST_LOG`: Log level (e.g., `info`, `debug`)

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::info;

use newslaunch::config::load_config;
use newslaunch::lambda::{ProducerHandler, producer_handler};
use newslaunch::utils::log::init_lambda_tracing;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    let config = load_config(None)?;
    init_lambda_tracing(&config.logging.level);

    info!("newslaunch producer starting...");
    let handler = Arc::new(ProducerHandler::from_config(&config).await?);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move { producer_handler(&*handler, event).await }
    }))
    .await
}
