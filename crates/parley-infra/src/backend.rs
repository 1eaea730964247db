//! Backend selection.
//!
//! Builds and initializes exactly one [`BoxChatBackend`] from the gateway
//! configuration. Runs once at process start.

use std::time::Duration;

use parley_core::backend::box_backend::BoxChatBackend;
use parley_core::backend::character::CharacterChatBackend;
use parley_core::backend::echo::EchoBackend;
use parley_core::backend::model_server::ModelServerBackend;
use parley_types::config::{BackendKind, GatewayConfig};
use parley_types::error::BackendError;

use crate::character_ai::CharacterAiClient;
use crate::ollama::OllamaClient;

/// Create and initialize the backend selected by `config.backend`.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built, or if the
/// character.ai login or chat opening fails. The model pull issued for the
/// Ollama backend never fails this call.
pub async fn create_backend(config: &GatewayConfig) -> Result<BoxChatBackend, BackendError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    match config.backend {
        BackendKind::Echo => Ok(BoxChatBackend::new(EchoBackend::new())),
        BackendKind::Ollama => {
            let client = OllamaClient::new(&config.ollama.base_url, timeout)?;
            tracing::info!(
                base_url = %config.ollama.base_url,
                model = %config.ollama.model,
                "initializing ollama backend"
            );
            let backend = ModelServerBackend::initialize(client, &config.ollama).await;
            Ok(BoxChatBackend::new(backend))
        }
        BackendKind::CharacterAi => {
            let settings = &config.character_ai;
            let client = CharacterAiClient::new(settings, timeout)?;
            tracing::info!(character_id = %settings.character_id, "initializing character.ai backend");
            let backend = CharacterChatBackend::initialize(
                client,
                settings.access_token.as_ref(),
                &settings.character_id,
            )
            .await?;
            Ok(BoxChatBackend::new(backend))
        }
    }
}
