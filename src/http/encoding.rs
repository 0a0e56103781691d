//! Content negotiation for response compression.
//!
//! Only gzip is supported. The decision is taken once per request from the
//! raw `Accept-Encoding` value; quality values are not interpreted, so
//! `gzip;q=0` is not treated as an acceptance of gzip.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use thiserror::Error;

pub const GZIP: &str = "gzip";

#[derive(Debug, Error)]
#[error("gzip compression failed: {0}")]
pub struct CompressionError(#[from] std::io::Error);

/// Returns true if any comma-separated token of `accept_encoding` is `gzip`,
/// ignoring case and surrounding whitespace.
///
/// ```
/// # use hearth::http::encoding::accepts_gzip;
/// assert!(accepts_gzip("deflate, GZip"));
/// assert!(!accepts_gzip(""));
/// assert!(!accepts_gzip("identity"));
/// ```
pub fn accepts_gzip(accept_encoding: &str) -> bool {
    accept_encoding
        .split(',')
        .any(|token| token.trim().eq_ignore_ascii_case(GZIP))
}

/// Compresses `data` into a complete gzip member.
pub fn gzip(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Produces the bytes to send for `body` and the `Content-Encoding` to
/// announce with them, if any.
///
/// A compression failure is not fatal: it is logged and the original body
/// is returned unencoded.
pub fn encode_body(body: Vec<u8>, gzip_negotiated: bool) -> (Vec<u8>, Option<&'static str>) {
    if !gzip_negotiated {
        return (body, None);
    }

    match gzip(&body) {
        Ok(compressed) => {
            tracing::trace!(
                original = body.len(),
                compressed = compressed.len(),
                "Compressed response body"
            );
            (compressed, Some(GZIP))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sending response body uncompressed");
            (body, None)
        }
    }
}
