//! AWS Lambda entry point for the newslaunch stream consumer.
//!
//! Subscribed to the Kinesis stream; decodes and logs each article.

use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;

use newslaunch::config::load_config;
use newslaunch::lambda::consumer::consumer_handler;
use newslaunch::utils::log::init_lambda_tracing;

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    let config = load_config(None)?;
    init_lambda_tracing(&config.logging.level);

    info!("newslaunch consumer starting...");
    lambda_runtime::run(service_fn(consumer_handler)).await
}
