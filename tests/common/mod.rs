//! Client-side helpers shared by the integration tests.

#![allow(dead_code)]

use hearth::http::headers::Headers;
use tokio::io::{AsyncRead, AsyncReadExt};

/// A response as a client reads it off the wire.
#[derive(Debug)]
pub struct WireResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Parses one response from the front of `buf`, framed by Content-Length.
/// Returns `None` if `buf` does not hold a complete response yet.
pub fn parse_response(buf: &[u8]) -> Option<(WireResponse, usize)> {
    let head_end = buf.windows(4).position(|w| w == b"\r\n\r\n")? + 4;
    let head = std::str::from_utf8(&buf[..head_end]).expect("response head is not UTF-8");

    let mut lines = head.split("\r\n");
    let status_line = lines.next()?;
    let mut parts = status_line.splitn(3, ' ');
    assert_eq!(parts.next(), Some("HTTP/1.1"), "bad status line {:?}", status_line);
    let status = parts.next()?.parse().expect("status code");
    let reason = parts.next().unwrap_or("").to_string();

    let mut headers = Headers::new();
    for line in lines.filter(|l| !l.is_empty()) {
        let (k, v) = line.split_once(':').expect("header line");
        headers.insert(k.trim(), v.trim());
    }

    let length: usize = headers
        .get("Content-Length")
        .map(|v| v.parse().expect("Content-Length"))
        .unwrap_or(0);

    if buf.len() < head_end + length {
        return None;
    }

    let body = buf[head_end..head_end + length].to_vec();
    Some((
        WireResponse {
            status,
            reason,
            headers,
            body,
        },
        head_end + length,
    ))
}

/// Reads one response from `stream`, keeping unconsumed bytes in `pending`.
/// Returns `None` if the stream ends before a complete response arrives.
pub async fn read_response<R>(stream: &mut R, pending: &mut Vec<u8>) -> Option<WireResponse>
where
    R: AsyncRead + Unpin,
{
    loop {
        if let Some((response, consumed)) = parse_response(pending) {
            pending.drain(..consumed);
            return Some(response);
        }

        let mut chunk = [0u8; 1024];
        let n = stream.read(&mut chunk).await.expect("read failed");
        if n == 0 {
            return None;
        }
        pending.extend_from_slice(&chunk[..n]);
    }
}

/// Reads until the peer closes, returning everything received.
pub async fn read_to_close<R>(stream: &mut R) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.expect("read failed");
    out
}

pub fn gunzip(data: &[u8]) -> Vec<u8> {
    use std::io::Read;

    let mut out = Vec::new();
    flate2::read::GzDecoder::new(data)
        .read_to_end(&mut out)
        .expect("invalid gzip body");
    out
}
