//! Application state shared by all HTTP handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use parley_core::backend::box_backend::BoxChatBackend;

/// Shared application state holding the single active backend.
///
/// The backend sits behind an async mutex held for the whole of each
/// `start`/`receive` call, so concurrent requests are served one at a time
/// and never interleave turns of the same conversation.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Mutex<BoxChatBackend>>,
    pub backend_name: Arc<str>,
}

impl AppState {
    pub fn new(backend: BoxChatBackend) -> Self {
        let backend_name: Arc<str> = Arc::from(backend.name());
        Self {
            backend: Arc::new(Mutex::new(backend)),
            backend_name,
        }
    }
}
