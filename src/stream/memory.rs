//! In-process stream backend.
//!
//! Models a sharded, append-only stream: records are routed to a shard by
//! hashing their partition key and get increasing sequence numbers. Used by
//! tests and by the CLI dry run.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::stream::{OutgoingRecord, RecordSink, WriteAck};

/// A record held by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub shard_id: String,
    pub sequence_number: String,
    pub partition_key: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    /// Stream name to shards, each an ordered list of records
    streams: HashMap<String, Vec<Vec<StoredRecord>>>,
    next_sequence: u64,
}

/// In-memory record sink with a fixed number of shards per stream.
#[derive(Debug)]
pub struct MemorySink {
    shard_count: usize,
    state: Mutex<State>,
    write_calls: AtomicUsize,
}

impl MemorySink {
    pub fn new(shard_count: usize) -> Self {
        Self {
            shard_count: shard_count.max(1),
            state: Mutex::new(State::default()),
            write_calls: AtomicUsize::new(0),
        }
    }

    /// Create an empty stream. Writes to unknown streams fail.
    pub fn with_stream(self, stream_name: &str) -> Self {
        self.lock()
            .streams
            .entry(stream_name.to_string())
            .or_insert_with(|| vec![Vec::new(); self.shard_count]);
        self
    }

    /// Number of put calls received, successful or not.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Records of one shard, in sequence order.
    pub fn shard_records(&self, stream_name: &str, shard: usize) -> Vec<StoredRecord> {
        self.lock()
            .streams
            .get(stream_name)
            .and_then(|shards| shards.get(shard))
            .cloned()
            .unwrap_or_default()
    }

    /// All records of a stream, shard by shard.
    pub fn records(&self, stream_name: &str) -> Vec<StoredRecord> {
        self.lock()
            .streams
            .get(stream_name)
            .map(|shards| shards.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn shard_for(&self, partition_key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        partition_key.hash(&mut hasher);
        (hasher.finish() % self.shard_count as u64) as usize
    }

    fn append(&self, stream_name: &str, records: Vec<OutgoingRecord>) -> Result<Vec<WriteAck>> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        let shards: Vec<usize> = records
            .iter()
            .map(|r| self.shard_for(&r.partition_key))
            .collect();

        let mut state = self.lock();
        let State {
            streams,
            next_sequence,
        } = &mut *state;

        let stream = streams.get_mut(stream_name).ok_or_else(|| {
            AppError::upstream(
                "memory",
                format!("ResourceNotFoundException: Stream {stream_name} not found"),
            )
        })?;

        let mut acks = Vec::with_capacity(records.len());
        for (record, shard) in records.into_iter().zip(shards) {
            *next_sequence += 1;
            let stored = StoredRecord {
                shard_id: format!("shardId-{shard:012}"),
                sequence_number: format!("{:056}", *next_sequence),
                partition_key: record.partition_key,
                data: record.data,
            };
            acks.push(WriteAck {
                shard_id: stored.shard_id.clone(),
                sequence_number: stored.sequence_number.clone(),
            });
            stream[shard].push(stored);
        }
        Ok(acks)
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn put_record(&self, stream_name: &str, record: OutgoingRecord) -> Result<WriteAck> {
        let mut acks = self.append(stream_name, vec![record])?;
        acks.pop()
            .ok_or_else(|| AppError::upstream("memory", "no acknowledgment for record"))
    }

    async fn put_records(
        &self,
        stream_name: &str,
        records: Vec<OutgoingRecord>,
    ) -> Result<Vec<WriteAck>> {
        self.append(stream_name, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, data: &str) -> OutgoingRecord {
        OutgoingRecord {
            data: data.as_bytes().to_vec(),
            partition_key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn test_same_key_same_shard_in_order() {
        let sink = MemorySink::new(4).with_stream("s");
        let first = sink.put_record("s", record("k", "1")).await.unwrap();
        let second = sink.put_record("s", record("k", "2")).await.unwrap();

        assert_eq!(first.shard_id, second.shard_id);
        assert!(first.sequence_number < second.sequence_number);

        let shard = sink.shard_for("k");
        let data: Vec<_> = sink
            .shard_records("s", shard)
            .into_iter()
            .map(|r| r.data)
            .collect();
        assert_eq!(data, [b"1".to_vec(), b"2".to_vec()]);
    }

    #[tokio::test]
    async fn test_records_span_all_shards() {
        let sink = MemorySink::new(3).with_stream("s");
        let batch = (0..30).map(|i| record(&format!("key-{i}"), "x")).collect();
        let acks = sink.put_records("s", batch).await.unwrap();

        assert_eq!(acks.len(), 30);
        assert_eq!(sink.records("s").len(), 30);
        let per_shard: usize = (0..3).map(|i| sink.shard_records("s", i).len()).sum();
        assert_eq!(per_shard, 30);
        assert_eq!(sink.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_stream_fails() {
        let sink = MemorySink::new(1);
        let err = sink.put_record("nope", record("k", "x")).await.unwrap_err();
        assert!(err.to_string().contains("ResourceNotFoundException"));
        assert_eq!(sink.write_calls(), 1);
    }
}
