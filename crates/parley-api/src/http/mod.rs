//! HTTP layer for parley.
//!
//! Axum-based gateway exposing `GET /start` and `POST /send`, returning the
//! canonical chat response as plain JSON.

pub mod error;
pub mod handlers;
pub mod router;
