use thiserror::Error;

/// Errors surfaced by backend operations.
///
/// Backends never retry or translate these; the caller decides what a
/// failure means for its user.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("upstream error: {message}")]
    Upstream { message: String },

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("no session started; call start first")]
    SessionNotStarted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
