//! Kinesis consumer skeleton.
//!
//! Decodes each record of a Kinesis event batch and logs it. Records that do
//! not decode are logged and counted; they never fail the batch.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::error::{AppError, Result};

/// Outcome of one batch.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Decode one base64 Kinesis payload into JSON.
pub fn decode_record(data: &str) -> Result<Value> {
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| AppError::validation(format!("record is not valid base64: {e}")))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Process a Kinesis event: `{"Records": [{"kinesis": {"data": ..}}, ..]}`.
pub fn process_batch(event: &Value) -> Result<BatchSummary> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::bad_request("event has no Records array"))?;

    info!("Processing new batch of {} records", records.len());

    let mut summary = BatchSummary::default();
    for record in records {
        let decoded = record
            .pointer("/kinesis/data")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::validation("record has no kinesis.data"))
            .and_then(decode_record);

        match decoded {
            Ok(article) => {
                let title = article.get("webTitle").and_then(Value::as_str);
                info!("Article processed: {}", title.unwrap_or("<untitled>"));
                summary.processed += 1;
            }
            Err(e) => {
                let sequence = record
                    .pointer("/kinesis/sequenceNumber")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                error!("Error processing record {}: {}", sequence, e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Processing complete: {} processed, {} failed",
        summary.processed, summary.failed
    );
    Ok(summary)
}

/// Lambda entry point for the consumer.
#[cfg(feature = "lambda")]
#[tracing::instrument(skip(event))]
pub async fn consumer_handler(
    event: lambda_runtime::LambdaEvent<Value>,
) -> std::result::Result<BatchSummary, lambda_runtime::Error> {
    Ok(process_batch(&event.payload)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn kinesis_event(payloads: &[&str]) -> Value {
        let records: Vec<Value> = payloads
            .iter()
            .enumerate()
            .map(|(i, data)| {
                json!({
                    "eventSource": "aws:kinesis",
                    "kinesis": { "data": data, "sequenceNumber": format!("{i}") }
                })
            })
            .collect();
        json!({ "Records": records })
    }

    #[test]
    fn test_decode_record() {
        let data = STANDARD.encode(r#"{"webTitle": "Hello"}"#);
        assert_eq!(decode_record(&data).unwrap(), json!({ "webTitle": "Hello" }));
        assert!(decode_record("***").is_err());
        assert!(decode_record(&STANDARD.encode("not json")).is_err());
    }

    #[test]
    fn test_bad_records_do_not_fail_batch() {
        let good = STANDARD.encode(r#"{"webTitle": "Hello"}"#);
        let event = kinesis_event(&[&good, "%%%", &good]);

        let summary = process_batch(&event).unwrap();
        assert_eq!(
            summary,
            BatchSummary {
                processed: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn test_event_without_records() {
        assert!(process_batch(&json!({})).is_err());
        assert_eq!(
            process_batch(&json!({ "Records": [] })).unwrap(),
            BatchSummary::default()
        );
    }
}
