//! Error types for the transformer.
//!
//! Store failures carry the bucket and key they were raised for. Payload
//! failures (decode, parse, encode) carry a message only; the caller logs the
//! failing key before propagating.

/// The result type used throughout the transformer.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while processing a notification.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source object or bucket does not exist.
    #[error("object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The store refused access to the object.
    #[error("access denied for s3://{bucket}/{key}: {message}")]
    Access {
        bucket: String,
        key: String,
        message: String,
    },

    /// Network or service failure talking to the store.
    #[error("store request failed for s3://{bucket}/{key}: {source}")]
    TransientStore {
        bucket: String,
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The payload is not gzip or does not decompress to UTF-8.
    #[error("decode error: {message}")]
    Decode { message: String },

    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("encode error: {message}")]
    Encode { message: String },

    /// The notification is missing the bucket name or object key.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Creates a transient store error with a source cause.
    #[must_use]
    pub fn transient(
        bucket: impl Into<String>,
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TransientStore {
            bucket: bucket.into(),
            key: key.into(),
            source: Box::new(source),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }
}
