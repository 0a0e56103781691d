//! Endpoint handlers.
//!
//! Each handler turns a request into a complete response. None of them
//! touch the connection.

use tracing::{debug, error, warn};

use crate::http::headers::{CONTENT_TYPE, USER_AGENT};
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::routes::files::{FileError, FileStore};

const OCTET_STREAM: &str = "application/octet-stream";

/// `GET /`
pub fn root() -> Response {
    Response::empty(StatusCode::Ok)
}

/// `GET /echo/<text>`: the raw text after the prefix.
pub fn echo(text: &str, gzip: bool) -> Response {
    Response::text(text, gzip)
}

/// `GET /user-agent`: the client's `User-Agent`, empty if it sent none.
pub fn user_agent(request: &Request, gzip: bool) -> Response {
    Response::text(request.header(USER_AGENT).unwrap_or(""), gzip)
}

/// `GET /files/<name>`
pub async fn get_file(files: &FileStore, name: &str, gzip: bool) -> Response {
    match files.read(name).await {
        Ok(contents) => ResponseBuilder::new(StatusCode::Ok)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .encoded_body(contents, gzip)
            .build(),
        Err(e @ FileError::NotFound { .. }) => {
            debug!(error = %e, "File not found");
            Response::not_found()
        }
        Err(e) => {
            warn!(error = %e, "Failed to serve file");
            Response::not_found()
        }
    }
}

/// `POST /files/<name>`: stores the request body.
///
/// Write failures are answered with 500 and the error text; names that do
/// not stay inside the serving directory are answered with 404.
pub async fn post_file(files: &FileStore, name: &str, body: &[u8], gzip: bool) -> Response {
    match files.write(name, body).await {
        Ok(()) => Response::empty(StatusCode::Created),
        Err(e @ FileError::InvalidName(_)) => {
            warn!(error = %e, "Rejected file upload");
            Response::not_found()
        }
        Err(e) => {
            error!(error = %e, "Failed to store uploaded file");
            ResponseBuilder::new(StatusCode::InternalServerError)
                .header(CONTENT_TYPE, "text/plain")
                .encoded_body(e.to_string(), gzip)
                .build()
        }
    }
}

pub fn not_found() -> Response {
    Response::not_found()
}

pub fn method_not_allowed() -> Response {
    Response::method_not_allowed()
}
