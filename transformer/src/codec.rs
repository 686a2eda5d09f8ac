//! Gzip + UTF-8 decoding of source payloads.

use std::io::Read;

use flate2::read::MultiGzDecoder;

use crate::error::{Error, Result};

/// Decompresses a gzip payload and returns its text.
///
/// Concatenated gzip members are read to the end, which is what Firehose and
/// `gzip -c a b` produce.
///
/// # Errors
///
/// Returns `Error::Decode` if the bytes are not a gzip stream or the
/// decompressed bytes are not UTF-8.
pub fn gunzip_to_string(compressed: &[u8]) -> Result<String> {
    let mut decoder = MultiGzDecoder::new(compressed);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::decode(format!("gzip decompression failed: {e}")))?;

    String::from_utf8(decompressed)
        .map_err(|e| Error::decode(format!("decompressed payload is not UTF-8: {e}")))
}

#[cfg(test)]
pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
