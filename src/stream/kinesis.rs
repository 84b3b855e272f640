//! AWS Kinesis stream backend.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_kinesis::Client;
use aws_sdk_kinesis::config::{Credentials, Region};
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::PutRecordsRequestEntry;
use tracing::{error, info};

use crate::error::{AppError, Result};
use crate::models::KinesisConfig;
use crate::stream::{OutgoingRecord, RecordSink, WriteAck};

const SERVICE: &str = "kinesis";

/// Kinesis-backed record sink.
#[derive(Debug, Clone)]
pub struct KinesisSink {
    client: Client,
}

impl KinesisSink {
    /// Wrap an existing Kinesis client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a sink from the `[kinesis]` configuration section.
    ///
    /// Static credentials are used when configured; otherwise the default
    /// AWS provider chain (environment, profile, Lambda role) applies.
    pub async fn from_config(config: &KinesisConfig) -> Self {
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(config.timeout_secs))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(timeouts);

        if let (Some(id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                "newslaunch-config",
            ));
        }
        if let Some(endpoint) = &config.endpoint_url {
            info!("Using Kinesis endpoint {}", endpoint);
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl RecordSink for KinesisSink {
    async fn put_record(&self, stream_name: &str, record: OutgoingRecord) -> Result<WriteAck> {
        let output = self
            .client
            .put_record()
            .stream_name(stream_name)
            .data(Blob::new(record.data))
            .partition_key(record.partition_key)
            .send()
            .await
            .map_err(|e| {
                error!(
                    "Error sending record to stream {}: {}",
                    stream_name,
                    DisplayErrorContext(&e)
                );
                AppError::upstream(SERVICE, DisplayErrorContext(&e))
            })?;

        Ok(WriteAck {
            shard_id: output.shard_id().to_string(),
            sequence_number: output.sequence_number().to_string(),
        })
    }

    async fn put_records(
        &self,
        stream_name: &str,
        records: Vec<OutgoingRecord>,
    ) -> Result<Vec<WriteAck>> {
        let total = records.len();
        let entries = records
            .into_iter()
            .map(|record| {
                PutRecordsRequestEntry::builder()
                    .data(Blob::new(record.data))
                    .partition_key(record.partition_key)
                    .build()
                    .map_err(|e| AppError::upstream(SERVICE, e))
            })
            .collect::<Result<Vec<_>>>()?;

        let output = self
            .client
            .put_records()
            .stream_name(stream_name)
            .set_records(Some(entries))
            .send()
            .await
            .map_err(|e| {
                error!(
                    "Error sending records to stream {}: {}",
                    stream_name,
                    DisplayErrorContext(&e)
                );
                AppError::upstream(SERVICE, DisplayErrorContext(&e))
            })?;

        let failed = output.failed_record_count().unwrap_or(0);
        if failed > 0 {
            let reason = output
                .records()
                .iter()
                .find_map(|entry| entry.error_message())
                .unwrap_or("unknown error");
            error!(
                "{} of {} records rejected by stream {}",
                failed, total, stream_name
            );
            return Err(AppError::upstream(
                SERVICE,
                format!("{failed} of {total} records rejected: {reason}"),
            ));
        }

        Ok(output
            .records()
            .iter()
            .map(|entry| WriteAck {
                shard_id: entry.shard_id().unwrap_or_default().to_string(),
                sequence_number: entry.sequence_number().unwrap_or_default().to_string(),
            })
            .collect())
    }
}
