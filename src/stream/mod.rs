//! Stream publishing.
//!
//! [`StreamWriter`] turns a payload into records and hands them to a
//! [`RecordSink`] backend:
//!
//! - Batched: one record holding the whole JSON-encoded list
//! - Per entry: one JSON-encoded record per element
//!
//! ```text
//! payload ──► StreamWriter ──► RecordSink
//!                               ├── KinesisSink  (AWS Kinesis)
//!                               └── MemorySink   (in-process shards)
//! ```

pub mod kinesis;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, Result};

// Re-export for convenience
pub use kinesis::KinesisSink;
pub use memory::MemorySink;

/// Most records accepted by a single batched put.
pub const MAX_RECORDS_PER_PUT: usize = 500;

/// A record ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRecord {
    /// UTF-8 JSON payload
    pub data: Vec<u8>,
    /// Shard routing key
    pub partition_key: String,
}

/// Acknowledgment returned by the stream service for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAck {
    pub shard_id: String,
    pub sequence_number: String,
}

/// Trait for stream backends.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write a single record.
    async fn put_record(&self, stream_name: &str, record: OutgoingRecord) -> Result<WriteAck>;

    /// Write a batch of at most [`MAX_RECORDS_PER_PUT`] records.
    ///
    /// Acks are returned in request order. Any rejected record fails the call.
    async fn put_records(
        &self,
        stream_name: &str,
        records: Vec<OutgoingRecord>,
    ) -> Result<Vec<WriteAck>>;
}

/// Publishes payloads to a named stream.
pub struct StreamWriter<S> {
    sink: S,
}

impl<S: RecordSink> StreamWriter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// The underlying backend.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Send `payload` to `stream_name`.
    ///
    /// With `record_per_entry` every element becomes its own record; a given
    /// `partition_key` is shared by all of them, otherwise each record gets a
    /// fresh UUID. Without it the whole slice is written as one record.
    pub async fn send<T: Serialize>(
        &self,
        stream_name: &str,
        payload: &[T],
        partition_key: Option<&str>,
        record_per_entry: bool,
    ) -> Result<Vec<WriteAck>> {
        validate_stream_name(stream_name)?;

        if !record_per_entry {
            let record = OutgoingRecord {
                data: serde_json::to_vec(payload)?,
                partition_key: partition_key_or_new(partition_key),
            };
            let ack = self.sink.put_record(stream_name, record).await?;
            info!(
                "Put {} entries as one record to stream {} ({})",
                payload.len(),
                stream_name,
                ack.shard_id
            );
            return Ok(vec![ack]);
        }

        let records = payload
            .iter()
            .map(|item| {
                Ok(OutgoingRecord {
                    data: serde_json::to_vec(item)?,
                    partition_key: partition_key_or_new(partition_key),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut acks = Vec::with_capacity(records.len());
        for batch in records.chunks(MAX_RECORDS_PER_PUT) {
            acks.extend(self.sink.put_records(stream_name, batch.to_vec()).await?);
        }

        info!("Put {} records to stream {}", acks.len(), stream_name);
        Ok(acks)
    }
}

/// Reject an empty stream name.
pub fn validate_stream_name(stream_name: &str) -> Result<()> {
    if stream_name.trim().is_empty() {
        return Err(AppError::validation("Stream name parameter required."));
    }
    Ok(())
}

fn partition_key_or_new(partition_key: Option<&str>) -> String {
    partition_key
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::{Value, json};

    use super::*;

    fn writer_with_stream(shards: usize) -> StreamWriter<MemorySink> {
        StreamWriter::new(MemorySink::new(shards).with_stream("test-stream"))
    }

    fn items(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({ "webTitle": format!("Article {i}") })).collect()
    }

    #[tokio::test]
    async fn test_empty_stream_name_rejected() {
        let writer = writer_with_stream(1);
        let err = writer.send("  ", &items(1), None, false).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(writer.sink().write_calls(), 0);
    }

    #[tokio::test]
    async fn test_batched_write_is_one_record() {
        let writer = writer_with_stream(2);
        let payload = items(3);
        let acks = writer
            .send("test-stream", &payload, Some("fixed"), false)
            .await
            .unwrap();

        assert_eq!(acks.len(), 1);
        let records = writer.sink().records("test-stream");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].partition_key, "fixed");

        let decoded: Vec<Value> = serde_json::from_slice(&records[0].data).unwrap();
        assert_eq!(decoded, payload);
    }

    #[tokio::test]
    async fn test_per_entry_write_generates_keys() {
        let writer = writer_with_stream(3);
        let acks = writer
            .send("test-stream", &items(4), None, true)
            .await
            .unwrap();

        assert_eq!(acks.len(), 4);
        assert_eq!(writer.sink().write_calls(), 1);

        let records = writer.sink().records("test-stream");
        let keys: HashSet<_> = records.iter().map(|r| r.partition_key.clone()).collect();
        assert_eq!(keys.len(), 4);
        for key in keys {
            assert!(Uuid::parse_str(&key).is_ok());
        }
    }

    #[tokio::test]
    async fn test_per_entry_write_reuses_given_key() {
        let writer = writer_with_stream(3);
        writer
            .send("test-stream", &items(3), Some("topic"), true)
            .await
            .unwrap();

        let records = writer.sink().records("test-stream");
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.partition_key == "topic"));
        // Same key, same shard, insertion order.
        let titles: Vec<String> = records
            .iter()
            .map(|r| serde_json::from_slice::<Value>(&r.data).unwrap()["webTitle"].to_string())
            .collect();
        assert_eq!(titles, ["\"Article 0\"", "\"Article 1\"", "\"Article 2\""]);
    }

    #[tokio::test]
    async fn test_per_entry_write_chunks_large_batches() {
        let writer = writer_with_stream(2);
        let acks = writer
            .send("test-stream", &items(MAX_RECORDS_PER_PUT + 1), None, true)
            .await
            .unwrap();

        assert_eq!(acks.len(), MAX_RECORDS_PER_PUT + 1);
        assert_eq!(writer.sink().write_calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_stream_is_upstream_error() {
        let writer = writer_with_stream(1);
        let err = writer.send("missing", &items(1), None, false).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }
}
