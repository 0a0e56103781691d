use std::future::Future;

use crate::http::request::Request;
use crate::http::response::Response;

/// The dispatch boundary between the connection loop and the application.
///
/// A connection calls `call` once per parsed request, with `gzip` set when
/// the client negotiated gzip content-coding. The service only builds the
/// response; writing it, and deciding whether the connection survives, stay
/// with the connection.
pub trait Service: Send + Sync + 'static {
    fn call(&self, request: &Request, gzip: bool) -> impl Future<Output = Response> + Send;
}
