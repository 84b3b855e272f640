//! newslaunch CLI
//!
//! Local execution entry point. For AWS Lambda, use `newslaunch-producer`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use newslaunch::{
    config::load_config,
    error::{AppError, Result},
    models::{AppConfig, SearchParams, SearchResults},
    services::GuardianClient,
    stream::{KinesisSink, MemorySink, RecordSink, StreamWriter, WriteAck},
    utils::log::filter_directive,
};
use serde::Serialize;

/// newslaunch - Guardian article search to Kinesis
#[derive(Parser, Debug)]
#[command(
    name = "newslaunch",
    version,
    about = "Search Guardian articles and publish previews to a Kinesis stream"
)]
struct Cli {
    /// Path to a TOML config file (default: newslaunch.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Guardian API key, overriding config and environment
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Search request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search articles and print the results as JSON
    Search {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Search articles and publish the results to a stream
    Publish {
        #[command(flatten)]
        query: QueryArgs,

        /// Destination stream name
        #[arg(short, long)]
        stream: String,

        /// Partition key shared by all records (default: random per record)
        #[arg(long)]
        partition_key: Option<String>,

        /// Write one record per article instead of a single batch record
        #[arg(long)]
        record_per_entry: bool,

        /// Write to an in-memory stream and print the records instead
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate and print the effective configuration
    Config,
}

/// Search parameters shared by `search` and `publish`.
#[derive(Args, Debug)]
struct QueryArgs {
    /// Search query
    term: String,

    /// Results per page (max 200)
    #[arg(long)]
    page_size: Option<u32>,

    /// Earliest publication date (YYYY-MM-DD)
    #[arg(long)]
    from_date: Option<String>,

    /// Sort order: newest, oldest or relevance
    #[arg(long)]
    order_by: Option<String>,

    /// Page of results
    #[arg(long)]
    page: Option<u32>,

    /// Return the raw API results instead of previews
    #[arg(long)]
    raw: bool,
}

impl QueryArgs {
    fn to_params(&self) -> SearchParams {
        let mut params = SearchParams::new(&self.term).filter_response(!self.raw);
        if let Some(size) = self.page_size {
            params = params.page_size(size);
        }
        if let Some(date) = &self.from_date {
            params = params.from_date(date);
        }
        if let Some(order) = &self.order_by {
            params = params.order_by(order);
        }
        if let Some(page) = self.page {
            params = params.page(page);
        }
        params
    }
}

/// A record as printed by `publish --dry-run`.
#[derive(Serialize)]
struct PrintedRecord {
    shard_id: String,
    sequence_number: String,
    partition_key: String,
    data: serde_json::Value,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { filter_directive(level) };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn search(config: &AppConfig, query: &QueryArgs) -> Result<Option<SearchResults>> {
    let client = GuardianClient::from_config(&config.guardian)?;
    client.search(&query.to_params()).await
}

async fn publish<S: RecordSink>(
    writer: &StreamWriter<S>,
    stream: &str,
    results: &SearchResults,
    partition_key: Option<&str>,
    record_per_entry: bool,
) -> Result<Vec<WriteAck>> {
    match results {
        SearchResults::Previews(items) => {
            writer
                .send(stream, items, partition_key, record_per_entry)
                .await
        }
        SearchResults::Raw(items) => {
            writer
                .send(stream, items, partition_key, record_per_entry)
                .await
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(key) = cli.api_key {
        config.guardian.api_key = Some(key);
    }
    if let Some(secs) = cli.timeout {
        config.guardian.request_timeout_secs = secs;
    }
    config.validate()?;

    init_logging(cli.verbose, &config.logging.level);

    match cli.command {
        Command::Search { query } => match search(&config, &query).await? {
            Some(results) => print_json(&results)?,
            None => log::info!("No results for '{}'", query.term),
        },

        Command::Publish {
            query,
            stream,
            partition_key,
            record_per_entry,
            dry_run,
        } => {
            let Some(results) = search(&config, &query).await? else {
                log::info!("No results for '{}', nothing published", query.term);
                return Ok(());
            };

            if dry_run {
                let writer = StreamWriter::new(MemorySink::new(1).with_stream(&stream));
                publish(
                    &writer,
                    &stream,
                    &results,
                    partition_key.as_deref(),
                    record_per_entry,
                )
                .await?;

                let records = writer
                    .sink()
                    .records(&stream)
                    .into_iter()
                    .map(|r| {
                        Ok(PrintedRecord {
                            data: serde_json::from_slice(&r.data)?,
                            shard_id: r.shard_id,
                            sequence_number: r.sequence_number,
                            partition_key: r.partition_key,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                print_json(&records)?;
            } else {
                let writer = StreamWriter::new(KinesisSink::from_config(&config.kinesis).await);
                let acks = publish(
                    &writer,
                    &stream,
                    &results,
                    partition_key.as_deref(),
                    record_per_entry,
                )
                .await?;

                log::info!(
                    "Published {} results to {} in {} records",
                    results.len(),
                    stream,
                    acks.len()
                );
                print_json(&acks)?;
            }
        }

        Command::Config => {
            let rendered = toml::to_string_pretty(&config.redacted())
                .map_err(|e| AppError::config(format!("Cannot render config: {e}")))?;
            log::info!("✓ Config OK");
            print!("{rendered}");
        }
    }

    Ok(())
}
