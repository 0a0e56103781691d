use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::CONTENT_LENGTH;
use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// A response whose announced framing does not match its body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("response has a {actual}-byte body but no Content-Length")]
    MissingContentLength { actual: usize },

    #[error("Content-Length {announced:?} does not match the {actual}-byte body")]
    LengthMismatch { announced: String, actual: usize },
}

/// Serializes `resp` into the exact bytes sent on the wire.
///
/// The body is only written after checking that `Content-Length` announces
/// exactly its size, so a client can never be desynchronized by a handler
/// that forgot to update the header.
pub fn serialize_response(resp: &Response) -> Result<Vec<u8>, FramingError> {
    check_framing(resp)?;

    let mut buf = Vec::with_capacity(128 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in resp.headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(&resp.body);

    Ok(buf)
}

fn check_framing(resp: &Response) -> Result<(), FramingError> {
    let actual = resp.body.len();

    match resp.headers.get(CONTENT_LENGTH) {
        Some(announced) if announced.trim().parse::<usize>().ok() == Some(actual) => Ok(()),
        Some(announced) => Err(FramingError::LengthMismatch {
            announced: announced.to_string(),
            actual,
        }),
        None if actual == 0 => Ok(()),
        None => Err(FramingError::MissingContentLength { actual }),
    }
}

/// A fully serialized response, written to the client in one piece.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Result<Self, FramingError> {
        Ok(Self {
            buffer: serialize_response(response)?,
            written: 0,
        })
    }

    pub async fn write_to_stream<S>(&mut self, stream: &mut S) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream
                .write(&self.buffer[self.written..])
                .await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
