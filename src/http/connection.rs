use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::http::headers::CONNECTION;
use crate::http::parser::{ParseError, RequestParser};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::service::Service;
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 4096;

/// After a close the server asked for, unread client bytes are drained for
/// at most this long, and at most `LINGER_MAX_BYTES` of them.
const LINGER_TIMEOUT: Duration = Duration::from_secs(1);
const LINGER_MAX_BYTES: usize = 64 * 1024;

/// Per-connection deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long to wait for the next bytes of a request, including the idle
    /// time between keep-alive requests.
    pub read: Duration,
    /// How long writing one response may take.
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(30),
            write: Duration::from_secs(30),
        }
    }
}

pub struct Connection<S, T> {
    stream: S,
    buffer: BytesMut,
    parser: RequestParser,
    state: ConnectionState,
    service: Arc<T>,
    timeouts: Timeouts,
}

pub enum ConnectionState {
    AwaitingRequest,
    Dispatching(Request),
    Writing(ResponseWriter, bool), // bool = close after writing?
    Closed,
}

impl<S, T> Connection<S, T>
where
    S: AsyncRead + AsyncWrite + Unpin,
    T: Service,
{
    pub fn new(stream: S, service: Arc<T>, timeouts: Timeouts) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            parser: RequestParser::new(),
            state: ConnectionState::AwaitingRequest,
            service,
            timeouts,
        }
    }

    /// Serves requests until the client goes away, asks to close, or the
    /// connection fails. The stream is shut down exactly once, whichever way
    /// the loop ends.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let result = self.drive().await;

        self.state = ConnectionState::Closed;
        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "Shutdown after close failed");
        }

        // Closing a TCP socket with unread input resets it, which can
        // destroy the response the client has not read yet
        if matches!(result, Ok(true)) {
            self.linger().await;
        }

        result.map(|_| ())
    }

    /// Runs the state machine. Returns `Ok(true)` when it stopped after a
    /// response that announced `Connection: close`.
    async fn drive(&mut self) -> anyhow::Result<bool> {
        loop {
            match &mut self.state {
                ConnectionState::AwaitingRequest => {
                    match self.read_request().await? {
                        Some(req) => {
                            self.state = ConnectionState::Dispatching(req);
                        }
                        None => {
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Dispatching(req) => {
                    // Decided from the request alone, whatever the handler does
                    let close = req.should_close();
                    let gzip = req.accepts_gzip();

                    let response = self.service.call(req, gzip).await;

                    info!(
                        method = %req.method,
                        path = %req.path,
                        status = response.status.as_u16(),
                        close,
                        "Handled request"
                    );

                    let writer = prepare_writer(response, close)?;
                    self.state = ConnectionState::Writing(writer, close);
                }

                ConnectionState::Writing(writer, close) => {
                    timeout(self.timeouts.write, writer.write_to_stream(&mut self.stream))
                        .await
                        .context("timed out writing response")??;

                    if *close {
                        self.state = ConnectionState::Closed;
                        return Ok(true);
                    }

                    self.state = ConnectionState::AwaitingRequest; // go back for next request
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(false)
    }

    /// Discards whatever the client still sends after the write side was
    /// shut down, until it closes too or the linger budget runs out.
    async fn linger(&mut self) {
        let mut discarded = self.buffer.len();
        self.buffer.clear();

        let drain = async {
            while discarded < LINGER_MAX_BYTES {
                self.buffer.reserve(READ_CHUNK);
                match self.stream.read_buf(&mut self.buffer).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        discarded += n;
                        self.buffer.clear();
                    }
                }
            }
        };

        if timeout(LINGER_TIMEOUT, drain).await.is_err() {
            debug!("Client kept the connection open after close");
        }

        debug!(discarded, "Discarded unread input");
    }

    /// Reads until one complete request is buffered.
    ///
    /// Returns `Ok(None)` when the stream ends (or stalls past the read
    /// timeout) between requests. Ending in the middle of a request, or
    /// receiving something that is not a request, is an error.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            // Try parsing whatever we already have
            let needed = match self.parser.parse(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete(needed)) => needed,

                Err(e) => {
                    return Err(e).context("HTTP parse error");
                }
            };

            self.buffer.reserve(READ_CHUNK);

            let ended = match timeout(self.timeouts.read, self.stream.read_buf(&mut self.buffer)).await {
                Ok(Ok(0)) => true,
                Ok(Ok(_)) => false,
                Ok(Err(e)) => {
                    debug!(error = %e, "Read failed");
                    true
                }
                Err(_) => {
                    debug!(timeout = ?self.timeouts.read, "Read timed out");
                    true
                }
            };

            if ended {
                if self.buffer.is_empty() {
                    debug!("Client closed connection");
                    return Ok(None);
                }

                return Err(needed.at_end_of_stream()).context("HTTP parse error");
            }
        }
    }
}

/// Finalizes a handler's response for the wire.
///
/// Announces the close when the connection is about to end. A response the
/// serializer refuses is replaced by an empty 500.
fn prepare_writer(mut response: Response, close: bool) -> anyhow::Result<ResponseWriter> {
    if close {
        response.headers.insert(CONNECTION, "close");
    }

    match ResponseWriter::new(&response) {
        Ok(writer) => Ok(writer),
        Err(e) => {
            error!(error = %e, status = response.status.as_u16(), "Handler produced an unframed response");

            let mut fallback = Response::internal_error();
            if close {
                fallback.headers.insert(CONNECTION, "close");
            }
            Ok(ResponseWriter::new(&fallback)?)
        }
    }
}
