//! CLI and HTTP gateway layer for parley.
//!
//! Exposes the router and application state so the binary and the
//! integration tests build the gateway the same way.

pub mod cli;
pub mod http;
pub mod state;
