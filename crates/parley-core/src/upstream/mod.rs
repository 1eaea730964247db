//! Upstream client ports.
//!
//! Traits describing what the stateful backends need from the outside world.
//! Implementations live in parley-infra (Ollama over HTTP, character.ai over
//! HTTP); tests supply in-memory fakes.

pub mod character;
pub mod completion;
