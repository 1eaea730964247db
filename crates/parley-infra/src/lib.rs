//! Infrastructure layer for parley.
//!
//! Concrete HTTP implementations of the upstream ports defined in
//! parley-core, the backend selector and the configuration file loader.

pub mod backend;
pub mod character_ai;
pub mod config;
pub mod http;
pub mod ollama;

#[cfg(test)]
pub(crate) mod test_support;
