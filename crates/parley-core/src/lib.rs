//! Backend contract and session state machines for parley.
//!
//! This crate defines the `ChatBackend` lifecycle every backend satisfies,
//! the three backend state machines, and the "ports" (upstream client traits)
//! that the infrastructure layer implements. It depends only on
//! `parley-types` -- never on `parley-infra` or any HTTP crate.

pub mod backend;
pub mod upstream;
