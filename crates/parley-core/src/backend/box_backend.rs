//! BoxChatBackend -- object-safe dynamic dispatch wrapper for ChatBackend.
//!
//! 1. `ChatBackendDyn` is the object-safe twin of `ChatBackend` with boxed futures
//! 2. Blanket-impl `ChatBackendDyn` for all `T: ChatBackend`
//! 3. `BoxChatBackend` wraps `Box<dyn ChatBackendDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use parley_types::chat::ChatResponse;
use parley_types::error::BackendError;

use super::chat_backend::ChatBackend;

type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatResponse, BackendError>> + Send + 'a>>;

/// Object-safe version of [`ChatBackend`] with boxed futures.
pub trait ChatBackendDyn: Send {
    fn name(&self) -> &str;

    fn start_boxed(&mut self) -> BackendFuture<'_>;

    fn receive_boxed<'a>(&'a mut self, message: &'a str) -> BackendFuture<'a>;
}

impl<T: ChatBackend> ChatBackendDyn for T {
    fn name(&self) -> &str {
        ChatBackend::name(self)
    }

    fn start_boxed(&mut self) -> BackendFuture<'_> {
        Box::pin(self.start())
    }

    fn receive_boxed<'a>(&'a mut self, message: &'a str) -> BackendFuture<'a> {
        Box::pin(self.receive(message))
    }
}

/// Type-erased chat backend, chosen once at process start.
///
/// Since `ChatBackend` uses RPITIT it cannot be a trait object directly;
/// `BoxChatBackend` offers the same methods through `ChatBackendDyn`.
pub struct BoxChatBackend {
    inner: Box<dyn ChatBackendDyn>,
}

impl BoxChatBackend {
    /// Wrap a concrete backend in a type-erased box.
    pub fn new<T: ChatBackend + 'static>(backend: T) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn start(&mut self) -> Result<ChatResponse, BackendError> {
        self.inner.start_boxed().await
    }

    pub async fn receive(&mut self, message: &str) -> Result<ChatResponse, BackendError> {
        self.inner.receive_boxed(message).await
    }
}

impl std::fmt::Debug for BoxChatBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxChatBackend")
            .field("name", &self.name())
            .finish()
    }
}
