//! Shared domain types for parley.
//!
//! The canonical chat response, the model-server transcript message, the
//! remote character-chat records, gateway configuration and the backend
//! error type.
//!
//! Zero infrastructure dependencies -- only serde, secrecy, thiserror.

pub mod character;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
