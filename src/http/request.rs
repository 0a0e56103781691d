use std::fmt;

use crate::http::encoding;
use crate::http::headers::{ACCEPT_ENCODING, CONNECTION, CONTENT_LENGTH, Headers};

/// HTTP request methods.
///
/// Any token is a legal method on the wire. The router only serves GET and
/// POST; everything else, including methods it has never heard of, is
/// answered with 405 Method Not Allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other token, kept exactly as received
    Extension(String),
}

impl Method {
    /// Parses an HTTP method token.
    ///
    /// Matching is case-sensitive, as methods are. Unknown tokens are not an
    /// error; they become [`Method::Extension`].
    ///
    /// # Example
    ///
    /// ```
    /// # use hearth::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::Extension("get".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Extension(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a parsed HTTP request from a client.
///
/// A `Request` only exists once the request line, the header block and any
/// declared body have all been read; partially received requests never
/// reach the router.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The raw request target (e.g., "/echo/abc"), not URL-decoded
    pub path: String,
    /// Protocol version token as sent (typically "HTTP/1.1")
    pub version: String,
    /// Request headers
    pub headers: Headers,
    /// Request body, empty unless a positive Content-Length was declared
    pub body: Vec<u8>,
}

/// Builder for constructing Request objects.
#[derive(Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Request {
    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid non-negative number.
    pub fn content_length(&self) -> usize {
        content_length(&self.headers)
    }

    /// Determines whether the connection must close after the response.
    ///
    /// `Connection: close` always closes. An HTTP/1.0 request closes unless
    /// it explicitly asked for `Connection: keep-alive`. Everything else
    /// keeps the connection open.
    pub fn should_close(&self) -> bool {
        let connection = self.header(CONNECTION).unwrap_or("");

        if connection.eq_ignore_ascii_case("close") {
            return true;
        }

        self.version == "HTTP/1.0" && !connection.eq_ignore_ascii_case("keep-alive")
    }

    /// Inverse of [`Request::should_close`].
    pub fn keep_alive(&self) -> bool {
        !self.should_close()
    }

    /// Whether the client advertised gzip in `Accept-Encoding`.
    pub fn accepts_gzip(&self) -> bool {
        encoding::accepts_gzip(self.header(ACCEPT_ENCODING).unwrap_or(""))
    }
}

pub(crate) fn content_length(headers: &Headers) -> usize {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}
