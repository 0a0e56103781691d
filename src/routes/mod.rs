//! Built-in endpoints
//!
//! Maps each request onto one of the server's handlers. Routing looks at the
//! method first and only then at the path, so an unsupported method is
//! answered with 405 whatever it targets.

pub mod files;
pub mod handlers;

pub use files::{FileError, FileStore};

use std::future::Future;

use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::service::Service;

pub const ECHO_PREFIX: &str = "/echo/";
pub const USER_AGENT_PREFIX: &str = "/user-agent";
pub const FILES_PREFIX: &str = "/files/";

/// The handler selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Root,
    /// Text after `/echo/`, raw
    Echo(&'a str),
    UserAgent,
    /// File name after `/files/`
    GetFile(&'a str),
    PostFile(&'a str),
    NotFound,
    MethodNotAllowed,
}

impl<'a> Route<'a> {
    /// Selects the route for `method` and `path`.
    ///
    /// GET checks, in order: exact `/`, then the `/echo/`, `/user-agent` and
    /// `/files/` prefixes. POST only serves `/files/`.
    pub fn resolve(method: &Method, path: &'a str) -> Self {
        match method {
            Method::GET => {
                if path == "/" {
                    Route::Root
                } else if let Some(text) = path.strip_prefix(ECHO_PREFIX) {
                    Route::Echo(text)
                } else if path.starts_with(USER_AGENT_PREFIX) {
                    Route::UserAgent
                } else if let Some(name) = path.strip_prefix(FILES_PREFIX) {
                    Route::GetFile(name)
                } else {
                    Route::NotFound
                }
            }
            Method::POST => match path.strip_prefix(FILES_PREFIX) {
                Some(name) => Route::PostFile(name),
                None => Route::NotFound,
            },
            _ => Route::MethodNotAllowed,
        }
    }
}

/// The server's request dispatcher.
///
/// Holds the only configuration the handlers need, the file store rooted at
/// the serving directory. It is built once at startup and shared read-only
/// by every connection.
#[derive(Debug, Clone)]
pub struct Router {
    files: FileStore,
}

impl Router {
    pub fn new(files: FileStore) -> Self {
        Self { files }
    }

    /// Builds the response for `request`. `gzip` is the negotiated
    /// content-coding for eligible bodies.
    pub async fn dispatch(&self, request: &Request, gzip: bool) -> Response {
        match Route::resolve(&request.method, &request.path) {
            Route::Root => handlers::root(),
            Route::Echo(text) => handlers::echo(text, gzip),
            Route::UserAgent => handlers::user_agent(request, gzip),
            Route::GetFile(name) => handlers::get_file(&self.files, name, gzip).await,
            Route::PostFile(name) => handlers::post_file(&self.files, name, &request.body, gzip).await,
            Route::NotFound => handlers::not_found(),
            Route::MethodNotAllowed => handlers::method_not_allowed(),
        }
    }
}

impl Service for Router {
    fn call(&self, request: &Request, gzip: bool) -> impl Future<Output = Response> + Send {
        self.dispatch(request, gzip)
    }
}
