use std::borrow::Cow;

use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::request::{self, Method, Request};

/// Largest request head (request line plus headers) accepted, in bytes.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

/// What the parser was still waiting for when it ran out of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Needed {
    /// The request line or header block is not terminated yet.
    Head { received: usize },
    /// The head is complete but the declared body is not.
    Body { declared: usize, received: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("request head exceeds {} bytes", MAX_HEAD_SIZE)]
    HeadTooLarge,

    #[error("incomplete request: {0:?}")]
    Incomplete(Needed),

    #[error("stream ended after {received} bytes of request head")]
    HeaderRead { received: usize },

    #[error("stream ended after {received} of {declared} body bytes")]
    BodyRead { declared: usize, received: usize },
}

impl Needed {
    /// The error to report when the stream ends while this was still needed.
    pub fn at_end_of_stream(self) -> ParseError {
        match self {
            Needed::Head { received } => ParseError::HeaderRead { received },
            Needed::Body { declared, received } => ParseError::BodyRead { declared, received },
        }
    }
}

/// A request line and header block whose body may still be arriving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: Method,
    pub path: String,
    pub version: String,
    pub headers: Headers,
}

impl RequestHead {
    pub fn content_length(&self) -> usize {
        request::content_length(&self.headers)
    }

    pub fn into_request(self, body: Vec<u8>) -> Request {
        Request {
            method: self.method,
            path: self.path,
            version: self.version,
            headers: self.headers,
            body,
        }
    }
}

/// Incremental request parser for one connection.
///
/// Progress is kept between calls, so each byte of a head is scanned once
/// however it is split across reads, and a head is parsed once however the
/// body behind it trickles in. Between two successful calls the caller may
/// only append to the buffer; once a request is returned, the caller drops
/// the consumed bytes and the parser starts over on what is left.
#[derive(Debug, Default)]
pub struct RequestParser {
    /// Start of the first head line whose terminator has not been seen.
    line_start: usize,
    /// How far the search for that terminator has got.
    searched: usize,
    /// Parsed head and its length in bytes, once the empty line was seen.
    head: Option<(RequestHead, usize)>,
}

impl RequestParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one request from the front of `buf`.
    ///
    /// On success returns the request and the number of bytes it occupied;
    /// anything after that belongs to the next request on the connection.
    /// `ParseError::Incomplete` means `buf` holds a valid prefix and more
    /// bytes are needed.
    pub fn parse(&mut self, buf: &[u8]) -> Result<(Request, usize), ParseError> {
        // A buffer shorter than what was already scanned is not a
        // continuation; start again rather than trust stale offsets
        if buf.len() < self.line_start.max(self.searched) {
            *self = Self::default();
        }

        let (head, head_len) = match self.head.take() {
            Some(parsed) => parsed,
            None => {
                let head_len = self.scan_head(buf)?;
                (parse_head(&buf[..head_len])?, head_len)
            }
        };

        let declared = head.content_length();
        let available = buf.len() - head_len;

        if available < declared {
            self.head = Some((head, head_len));
            return Err(ParseError::Incomplete(Needed::Body {
                declared,
                received: available,
            }));
        }

        *self = Self::default();

        let body = buf[head_len..head_len + declared].to_vec();
        Ok((head.into_request(body), head_len + declared))
    }

    /// Finds the end of the head, resuming where the last call stopped.
    /// The request line is checked as soon as it is complete.
    fn scan_head(&mut self, buf: &[u8]) -> Result<usize, ParseError> {
        loop {
            let from = self.searched.max(self.line_start);
            let Some(offset) = buf[from..].iter().position(|&b| b == b'\n') else {
                self.searched = buf.len();
                return Err(incomplete_head(buf));
            };

            let end = from + offset;
            let line = strip_cr(&buf[self.line_start..end]);
            let is_request_line = self.line_start == 0;

            self.line_start = end + 1;
            self.searched = self.line_start;

            if self.line_start > MAX_HEAD_SIZE {
                return Err(ParseError::HeadTooLarge);
            }

            if is_request_line {
                split_request_line(&String::from_utf8_lossy(line))?;
            } else if line.is_empty() {
                return Ok(self.line_start);
            }
        }
    }
}

/// Parses one request from the front of `buf` with a fresh parser.
///
/// Suited to a buffer that already holds the whole request. A connection
/// reading a request in pieces keeps a [`RequestParser`] instead.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    RequestParser::new().parse(buf)
}

/// Parses a complete head: request line, header lines and the empty line.
fn parse_head(buf: &[u8]) -> Result<RequestHead, ParseError> {
    let mut cursor = 0;

    // Request line
    let request_line = next_line(buf, &mut cursor).ok_or_else(|| incomplete_head(buf))?;
    let (method, path, version) = split_request_line(&request_line)?;

    // Headers
    let mut fields = Vec::new();

    while let Some(line) = next_line(buf, &mut cursor) {
        if line.is_empty() {
            break;
        }

        // The name is kept as sent; lines without a colon are ignored
        // rather than failing the request
        if let Some((name, value)) = line.split_once(':') {
            fields.push((name.to_string(), value.trim().to_string()));
        }
    }

    Ok(RequestHead {
        method: Method::parse(method),
        path: path.to_string(),
        version: version.to_string(),
        headers: fields.into_iter().collect(),
    })
}

fn split_request_line(line: &str) -> Result<(&str, &str, &str), ParseError> {
    let mut parts = line.splitn(3, ' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), Some(version)) => Ok((method, path, version)),
        _ => Err(ParseError::MalformedRequestLine(line.to_string())),
    }
}

/// Returns the next `\n`-terminated line starting at `cursor`, without its
/// terminator or a trailing `\r`, and advances `cursor` past it.
fn next_line<'a>(buf: &'a [u8], cursor: &mut usize) -> Option<Cow<'a, str>> {
    let rest = &buf[*cursor..];
    let end = rest.iter().position(|&b| b == b'\n')?;
    *cursor += end + 1;

    Some(String::from_utf8_lossy(strip_cr(&rest[..end])))
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn incomplete_head(buf: &[u8]) -> ParseError {
    if buf.len() > MAX_HEAD_SIZE {
        ParseError::HeadTooLarge
    } else {
        ParseError::Incomplete(Needed::Head { received: buf.len() })
    }
}
