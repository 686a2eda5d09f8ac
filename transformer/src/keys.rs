//! Object key handling: decoding keys from S3 notifications and deriving the
//! Parquet destination key.

use percent_encoding::percent_decode_str;

use crate::error::{Error, Result};

/// Extension appended to every destination key.
pub const PARQUET_EXTENSION: &str = "parquet";

const COMPRESSION_EXTENSIONS: &[&str] = &["gz", "gzip"];
const JSON_EXTENSIONS: &[&str] = &["json", "jsonl", "ndjson"];

/// Decodes an object key as S3 places it in event notifications.
///
/// Spaces arrive as `+` and everything else non-ASCII or reserved is
/// percent-encoded, so `+` is mapped to a space before percent-decoding.
///
/// # Errors
///
/// Returns `Error::InvalidEvent` if the decoded bytes are not UTF-8.
pub fn decode_object_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|key| key.into_owned())
        .map_err(|e| Error::InvalidEvent(format!("object key {raw:?} is not valid UTF-8: {e}")))
}

/// Derives the destination key for a decoded source key.
///
/// Only the last path segment changes: its file extension is replaced by
/// `.parquet`. A compression extension also takes the JSON extension in
/// front of it, so `file.json.gz` becomes `file.parquet`.
#[must_use]
pub fn destination_key(source_key: &str) -> String {
    let (dir, name) = match source_key.rfind('/') {
        Some(idx) => source_key.split_at(idx + 1),
        None => ("", source_key),
    };

    let mut stem = name;
    if let Some((rest, ext)) = split_extension(stem) {
        stem = rest;
        if COMPRESSION_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            if let Some((rest, inner)) = split_extension(stem) {
                if JSON_EXTENSIONS.contains(&inner.to_ascii_lowercase().as_str()) {
                    stem = rest;
                }
            }
        }
    }

    format!("{dir}{stem}.{PARQUET_EXTENSION}")
}

/// Splits `name` at its last dot. Leading dots do not start an extension.
fn split_extension(name: &str) -> Option<(&str, &str)> {
    let trimmed = name.trim_start_matches('.');
    let offset = name.len() - trimmed.len();
    let idx = trimmed.rfind('.')?;
    Some((&name[..offset + idx], &trimmed[idx + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_segments_are_preserved() {
        assert_eq!(
            destination_key("year=2025/month=11/day=23/file.json.gz"),
            "year=2025/month=11/day=23/file.parquet"
        );
    }

    #[test]
    fn inner_dots_in_the_name_survive() {
        assert_eq!(destination_key("a.b.json.gz"), "a.b.parquet");
        assert_eq!(destination_key("logs/a.b.gz"), "logs/a.b.parquet");
    }

    #[test]
    fn single_extension_is_replaced() {
        assert_eq!(destination_key("data/report.gz"), "data/report.parquet");
        assert_eq!(destination_key("data/report.json"), "data/report.parquet");
        assert_eq!(destination_key("data/report.csv.gz"), "data/report.csv.parquet");
    }

    #[test]
    fn names_without_extension_get_one() {
        assert_eq!(destination_key("dir.v1/file"), "dir.v1/file.parquet");
        assert_eq!(destination_key("dir/.hidden"), "dir/.hidden.parquet");
        assert_eq!(destination_key("dir/.hidden.gz"), "dir/.hidden.parquet");
    }

    #[test]
    fn firehose_style_key_keeps_dashes_and_dots() {
        assert_eq!(
            destination_key("2025/11/23/10/stream-1-2025-11-23-10-00-00-abc.json.GZ"),
            "2025/11/23/10/stream-1-2025-11-23-10-00-00-abc.parquet"
        );
    }

    #[test]
    fn keys_are_percent_decoded() {
        assert_eq!(decode_object_key("a%2Bb.json.gz").unwrap(), "a+b.json.gz");
        assert_eq!(
            decode_object_key("my+folder/caf%C3%A9.json.gz").unwrap(),
            "my folder/café.json.gz"
        );
        assert_eq!(
            decode_object_key("year%3D2025/file.json.gz").unwrap(),
            "year=2025/file.json.gz"
        );
    }

    #[test]
    fn invalid_utf8_key_is_rejected() {
        let err = decode_object_key("bad%FF.json.gz").unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
    }
}
