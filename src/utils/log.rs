// src/utils/log.rs

//! Log level handling shared by the CLI and Lambda entry points.

/// Normalize a configured level to a `tracing`/`env_logger` filter directive.
///
/// Accepts the Python-style names (`WARNING`, `CRITICAL`) that older
/// deployments still set in `LOG_LEVEL`. Unknown values fall back to `info`.
pub fn filter_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        _ => "info",
    }
}

/// Initialize JSON tracing for a Lambda binary.
///
/// `RUST_LOG` wins when set; otherwise the configured level is used.
#[cfg(feature = "lambda")]
pub fn init_lambda_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
