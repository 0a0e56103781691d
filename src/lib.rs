//! Hearth - minimal HTTP/1.1 server
//!
//! Core library: the HTTP engine, the built-in routes and the listener.

pub mod config;
pub mod http;
pub mod routes;
pub mod server;
