//! HTTP/1.1 protocol engine.
//!
//! This module implements the wire side of the server: parsing requests,
//! serializing responses and running keep-alive connections. It knows
//! nothing about routes; it hands every request to a [`service::Service`].
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection request/response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`headers`**: Case-insensitive header collection
//! - **`encoding`**: gzip content negotiation
//! - **`service`**: The dispatch boundary the connection calls into
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌───────────────────┐
//!        │  AwaitingRequest  │ ← Wait for a complete request
//!        └─────────┬─────────┘
//!                  │ Request parsed          (EOF / parse error → Closed)
//!                  ▼
//!        ┌───────────────────┐
//!        │    Dispatching    │ ← Decide close + gzip, call the service
//!        └─────────┬─────────┘
//!                  │ Response ready
//!                  ▼
//!        ┌───────────────────┐
//!        │      Writing      │ ← Send the whole response at once
//!        └─────────┬─────────┘
//!                  │ Response sent
//!                  ├─ Keep-Alive → AwaitingRequest (same connection)
//!                  └─ Close → Closed
//! ```
//!
//! The connection closes after a response when the request carried
//! `Connection: close`, or was HTTP/1.0 without `Connection: keep-alive`.
//! In that case the response itself carries `Connection: close`.

pub mod connection;
pub mod encoding;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod service;
pub mod writer;
