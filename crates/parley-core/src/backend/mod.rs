//! Chat backend abstractions for parley.
//!
//! - `ChatBackend`: RPITIT trait for the concrete backends
//! - `BoxChatBackend`: object-safe wrapper for runtime backend selection
//! - `EchoBackend`, `ModelServerBackend`, `CharacterChatBackend`: the state machines

pub mod box_backend;
pub mod character;
pub mod chat_backend;
pub mod echo;
pub mod model_server;
pub mod transcript;
