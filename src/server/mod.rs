//! TCP front end: binds the listening socket and hands every accepted
//! connection to its own task.

pub mod listener;
