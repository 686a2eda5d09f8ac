//! The per-notification pipeline: fetch, decompress, parse, drop excluded
//! columns, encode as Parquet and store under the derived key.

use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use bytes::Bytes;
use lambda_runtime::tracing;

use crate::codec::gunzip_to_string;
use crate::config::TransformerConfig;
use crate::error::{Error, Result};
use crate::keys::{decode_object_key, destination_key};
use crate::parquet_writer::write_table;
use crate::store::ObjectStore;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

/// Outcome of one processed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    pub source: ObjectLocation,
    pub destination: ObjectLocation,
    pub removed_columns: Vec<String>,
}

/// Converts gzip JSON objects into Parquet objects.
pub struct RecordTransformer<S> {
    store: S,
    config: TransformerConfig,
}

impl<S: ObjectStore> RecordTransformer<S> {
    pub fn new(store: S, config: TransformerConfig) -> Self {
        Self { store, config }
    }

    /// Processes every record of `event` in order, stopping at the first
    /// failure. Objects written before the failure are left in place.
    pub async fn process_event(&self, event: &S3Event) -> Result<Vec<TransformOutcome>> {
        let mut outcomes = Vec::with_capacity(event.records.len());
        for record in &event.records {
            outcomes.push(self.process_record(record).await?);
        }
        Ok(outcomes)
    }

    pub async fn process_record(&self, record: &S3EventRecord) -> Result<TransformOutcome> {
        let source = source_location(record).inspect_err(|e| {
            tracing::error!(error = %e, "Invalid notification record");
        })?;
        tracing::info!(
            bucket = %source.bucket,
            key = %source.key,
            "Processing object"
        );

        match self.transform_object(&source).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(
                    bucket = %source.bucket,
                    key = %source.key,
                    error = %e,
                    "Error processing object"
                );
                Err(e)
            }
        }
    }

    async fn transform_object(&self, source: &ObjectLocation) -> Result<TransformOutcome> {
        let compressed = self.store.get(&source.bucket, &source.key).await?;
        let (encoded, removed_columns) = self.encode_payload(&source.key, &compressed)?;

        let destination = ObjectLocation {
            bucket: self.config.dest_bucket.clone(),
            key: destination_key(&source.key),
        };
        self.store
            .put(&destination.bucket, &destination.key, encoded)
            .await?;
        tracing::info!(
            bucket = %destination.bucket,
            key = %destination.key,
            "Successfully wrote Parquet file"
        );

        Ok(TransformOutcome {
            source: source.clone(),
            destination,
            removed_columns,
        })
    }

    /// Turns a gzip JSON payload into Parquet bytes, returning the names of
    /// the columns that were dropped.
    fn encode_payload(&self, key: &str, compressed: &[u8]) -> Result<(Bytes, Vec<String>)> {
        let text = gunzip_to_string(compressed)?;
        let mut table = Table::from_json_str(&text)?;
        tracing::info!(
            key = %key,
            rows = table.num_rows(),
            columns = table.columns().len(),
            "Parsed record into table"
        );
        tracing::debug!(
            key = %key,
            columns = ?table.column_names().collect::<Vec<_>>(),
            "Parsed columns"
        );

        let removed = table.drop_columns(&self.config.excluded_fields);
        for column in &removed {
            tracing::info!(key = %key, column = %column, "Removed column");
        }

        Ok((write_table(&table)?, removed))
    }
}

fn source_location(record: &S3EventRecord) -> Result<ObjectLocation> {
    let bucket = record
        .s3
        .bucket
        .name
        .clone()
        .ok_or_else(|| Error::InvalidEvent("record has no bucket name".to_string()))?;
    let raw_key = record
        .s3
        .object
        .key
        .as_deref()
        .ok_or_else(|| Error::InvalidEvent("record has no object key".to_string()))?;
    Ok(ObjectLocation {
        bucket,
        key: decode_object_key(raw_key)?,
    })
}

#[cfg(test)]
pub(crate) fn s3_record(bucket: &str, key: &str) -> S3EventRecord {
    use aws_lambda_events::event::s3::{S3Bucket, S3Entity, S3Object};

    S3EventRecord {
        s3: S3Entity {
            bucket: S3Bucket {
                name: Some(bucket.to_string()),
                ..Default::default()
            },
            object: S3Object {
                key: Some(key.to_string()),
                ..Default::default()
            },
            schema_version: Some("1.0".to_string()),
            configuration_id: None,
        },
        ..Default::default()
    }
}
