//! Object store capability used by the transformer.
//!
//! The transformer only needs whole-object reads and writes. [`S3Store`] is
//! the production implementation; tests substitute an in-memory store or a
//! mocked S3 client.

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use crate::error::{Error, Result};

pub const PARQUET_CONTENT_TYPE: &str = "application/vnd.apache.parquet";

const NOT_FOUND_CODES: &[&str] = &["NoSuchKey", "NoSuchBucket", "NotFound"];
const ACCESS_CODES: &[&str] = &[
    "AccessDenied",
    "AllAccessDisabled",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "Forbidden",
];

/// Whole-object read/write access to a bucketed store.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Reads the full content of `bucket/key`.
    ///
    /// Returns `Error::NotFound`, `Error::Access` or `Error::TransientStore`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes>;

    /// Writes `data` to `bucket/key` in a single request.
    ///
    /// Returns `Error::Access` or `Error::TransientStore`.
    async fn put(&self, bucket: &str, key: &str, data: Bytes) -> Result<()>;
}

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    Error::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    classify_sdk_error(e, bucket, key)
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| Error::transient(bucket, key, e))?;
        Ok(body.into_bytes())
    }

    async fn put(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(PARQUET_CONTENT_TYPE)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| classify_sdk_error(e, bucket, key))?;
        Ok(())
    }
}

fn classify_sdk_error<E>(err: SdkError<E, HttpResponse>, bucket: &str, key: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = match &err {
        SdkError::ServiceError(ctx) => Some(ctx.raw().status().as_u16()),
        _ => None,
    };
    let code = err.code();

    if code.is_some_and(|c| NOT_FOUND_CODES.contains(&c)) || status == Some(404) {
        return Error::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        };
    }
    if code.is_some_and(|c| ACCESS_CODES.contains(&c)) || status == Some(403) {
        let message = err
            .message()
            .or(code)
            .unwrap_or("forbidden")
            .to_string();
        return Error::Access {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        };
    }
    Error::transient(bucket, key, err)
}
