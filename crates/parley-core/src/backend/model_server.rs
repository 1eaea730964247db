//! Model-server backend: a rolling transcript replayed to a stateless
//! chat-completion endpoint.
//!
//! The remote endpoint remembers nothing between calls, so the transcript
//! *is* the session: configured system prompts first, then the opener, then
//! alternating user/assistant turns in chronological order.

use parley_types::chat::ChatResponse;
use parley_types::config::OllamaConfig;
use parley_types::error::BackendError;
use parley_types::llm::{CompletionReply, Message};

use super::chat_backend::ChatBackend;
use super::transcript::Transcript;
use crate::upstream::completion::{CompletionClient, CompletionRequest};

/// Sampling temperature sent with every completion.
pub const COMPLETION_TEMPERATURE: f64 = 1.0;

/// Chat-completion backed conversation.
///
/// Prompt configuration is fixed at construction; the transcript is the only
/// mutable state and is rebuilt from scratch by every `start`.
pub struct ModelServerBackend<C> {
    client: C,
    model: String,
    pre_introduction_prompts: Vec<String>,
    initial_prompt: String,
    post_introduction_prompts: Vec<String>,
    transcript: Transcript,
    started: bool,
}

impl<C: CompletionClient> ModelServerBackend<C> {
    /// Build the backend and ask the server to pull the model.
    ///
    /// Blank pre-introduction prompts are dropped. The pull result is not
    /// inspected for success: a failure is only logged.
    pub async fn initialize(client: C, config: &OllamaConfig) -> Self {
        let backend = Self::new(client, config);

        match backend.client.ensure_model(&backend.model).await {
            Ok(()) => tracing::info!(model = %backend.model, "model pull requested"),
            Err(e) => tracing::warn!(model = %backend.model, "model pull failed: {e}"),
        }

        backend
    }

    /// Build the backend without contacting the server.
    pub fn new(client: C, config: &OllamaConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            pre_introduction_prompts: config
                .pre_introduction_prompts
                .iter()
                .filter(|p| !p.trim().is_empty())
                .cloned()
                .collect(),
            initial_prompt: config.initial_prompt.clone(),
            post_introduction_prompts: config.post_introduction_prompts.clone(),
            transcript: Transcript::new(),
            started: false,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Read-only view of the current transcript.
    pub fn transcript(&self) -> &[Message] {
        self.transcript.as_slice()
    }

    /// Append `message` as a user turn (unless empty), send the whole
    /// transcript and append the reply.
    ///
    /// On failure the user turn stays in the transcript.
    async fn send_prompt(&mut self, message: &str) -> Result<ChatResponse, BackendError> {
        if !message.is_empty() {
            self.transcript.push(Message::user(message));
        }

        tracing::debug!(
            model = %self.model,
            entries = self.transcript.len(),
            "sending transcript to completion endpoint"
        );

        let reply = self
            .client
            .chat(CompletionRequest {
                model: &self.model,
                messages: self.transcript.as_slice(),
                temperature: COMPLETION_TEMPERATURE,
            })
            .await?;

        let response = self.to_chat_response(&reply);
        self.transcript.push(reply.message);
        Ok(response)
    }

    /// The server gives no session id, so the reply's creation timestamp
    /// stands in for both message id and chat id.
    fn to_chat_response(&self, reply: &CompletionReply) -> ChatResponse {
        ChatResponse {
            id: reply.created_at.clone(),
            character_id: self.model.clone(),
            chat_id: reply.created_at.clone(),
            image_relative_path: Some(String::new()),
            src_name: format!("ollama-{}", self.model),
            text: reply.message.content.clone(),
        }
    }
}

impl<C: CompletionClient> ChatBackend for ModelServerBackend<C> {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn start(&mut self) -> Result<ChatResponse, BackendError> {
        let opener = self
            .pre_introduction_prompts
            .iter()
            .map(|p| Message::system(p.as_str()))
            .chain(std::iter::once(Message::user(self.initial_prompt.as_str())));
        self.transcript.replace(opener);
        self.started = true;

        // Post-introduction prompts must not influence the greeting itself.
        let greeting = self.send_prompt("").await?;

        self.transcript.extend(
            self.post_introduction_prompts
                .iter()
                .map(|p| Message::system(p.as_str())),
        );

        tracing::info!(
            model = %self.model,
            entries = self.transcript.len(),
            "model-server chat started"
        );
        Ok(greeting)
    }

    async fn receive(&mut self, message: &str) -> Result<ChatResponse, BackendError> {
        if !self.started {
            return Err(BackendError::SessionNotStarted);
        }
        self.send_prompt(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::llm::MessageRole;
    use std::sync::{Arc, Mutex};

    // --- Mock completion client ---

    #[derive(Clone, Default)]
    struct MockCompletion {
        sent: Arc<Mutex<Vec<Vec<Message>>>>,
        temperatures: Arc<Mutex<Vec<f64>>>,
        pulls: Arc<Mutex<Vec<String>>>,
        fail_pull: bool,
        fail_chat: bool,
    }

    impl MockCompletion {
        fn sent(&self) -> Vec<Vec<Message>> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl CompletionClient for MockCompletion {
        async fn ensure_model(&self, model: &str) -> Result<(), BackendError> {
            self.pulls.lock().unwrap().push(model.to_string());
            if self.fail_pull {
                return Err(BackendError::Upstream {
                    message: "connection refused".to_string(),
                });
            }
            Ok(())
        }

        async fn chat(&self, request: CompletionRequest<'_>) -> Result<CompletionReply, BackendError> {
            if self.fail_chat {
                return Err(BackendError::Upstream {
                    message: "connection reset".to_string(),
                });
            }
            self.temperatures.lock().unwrap().push(request.temperature);
            let mut sent = self.sent.lock().unwrap();
            sent.push(request.messages.to_vec());
            let n = sent.len();
            Ok(CompletionReply {
                message: Message::assistant(format!("reply{n}")),
                created_at: format!("2024-01-0{n}T00:00:00Z"),
            })
        }
    }

    fn config(pre: &[&str], initial: &str, post: &[&str]) -> OllamaConfig {
        OllamaConfig {
            base_url: "http://localhost:11434".to_string(),
            model: "neural-chat".to_string(),
            pre_introduction_prompts: pre.iter().map(|s| s.to_string()).collect(),
            initial_prompt: initial.to_string(),
            post_introduction_prompts: post.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn roles_and_contents(messages: &[Message]) -> Vec<(MessageRole, &str)> {
        messages.iter().map(|m| (m.role, m.content.as_str())).collect()
    }

    #[tokio::test]
    async fn test_end_to_end_prompt_ordering() {
        let client = MockCompletion::default();
        let mut backend = ModelServerBackend::initialize(client.clone(), &config(&["A"], "B", &["C"])).await;

        let greeting = backend.start().await.unwrap();
        assert_eq!(greeting.text, "reply1");
        assert_eq!(
            roles_and_contents(backend.transcript()),
            vec![
                (MessageRole::System, "A"),
                (MessageRole::User, "B"),
                (MessageRole::Assistant, "reply1"),
                (MessageRole::System, "C"),
            ]
        );

        let reply = backend.receive("D").await.unwrap();
        assert_eq!(reply.text, "reply2");
        assert_eq!(
            roles_and_contents(&backend.transcript()[4..]),
            vec![(MessageRole::User, "D"), (MessageRole::Assistant, "reply2")]
        );

        let sent = client.sent();
        // The greeting never sees the post-introduction prompt.
        assert_eq!(
            roles_and_contents(&sent[0]),
            vec![(MessageRole::System, "A"), (MessageRole::User, "B")]
        );
        assert_eq!(sent[1].len(), 5);
        assert_eq!(sent[1].last().unwrap(), &Message::user("D"));
    }

    #[tokio::test]
    async fn test_transcript_length_after_start_filters_blank_prompts() {
        let client = MockCompletion::default();
        let mut backend =
            ModelServerBackend::new(client, &config(&["one", "", "  ", "two"], "hi", &["p1", "p2", "p3"]));

        backend.start().await.unwrap();
        let transcript = backend.transcript();
        assert_eq!(transcript.len(), 2 + 1 + 1 + 3);
        assert!(transcript[..2].iter().all(|m| m.role == MessageRole::System));
        assert_eq!(transcript[2], Message::user("hi"));
        assert_eq!(transcript[3].role, MessageRole::Assistant);
        assert!(transcript[4..].iter().all(|m| m.role == MessageRole::System));
    }

    #[tokio::test]
    async fn test_each_receive_sends_previous_transcript_plus_new_turn() {
        let client = MockCompletion::default();
        let mut backend = ModelServerBackend::new(client.clone(), &config(&["sys"], "intro", &[]));
        backend.start().await.unwrap();

        for turn in ["first", "second", "third"] {
            let before = backend.transcript().to_vec();
            backend.receive(turn).await.unwrap();

            let sent = client.sent();
            let mut expected = before.clone();
            expected.push(Message::user(turn));
            assert_eq!(sent.last().unwrap(), &expected);
            assert_eq!(backend.transcript().len(), before.len() + 2);
            assert_eq!(backend.transcript().last().unwrap().role, MessageRole::Assistant);
        }
    }

    #[tokio::test]
    async fn test_empty_receive_adds_no_user_turn() {
        let client = MockCompletion::default();
        let mut backend = ModelServerBackend::new(client.clone(), &config(&[], "intro", &[]));
        backend.start().await.unwrap();
        let before = backend.transcript().to_vec();

        backend.receive("").await.unwrap();

        assert_eq!(client.sent().last().unwrap(), &before);
        assert_eq!(backend.transcript().len(), before.len() + 1);
        assert_eq!(backend.transcript().last().unwrap().role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_restart_discards_previous_transcript() {
        let client = MockCompletion::default();
        let mut backend = ModelServerBackend::new(client.clone(), &config(&["A"], "B", &["C"]));
        backend.start().await.unwrap();
        backend.receive("D").await.unwrap();

        backend.start().await.unwrap();
        assert_eq!(backend.transcript().len(), 4);
        assert_eq!(
            roles_and_contents(&client.sent()[2]),
            vec![(MessageRole::System, "A"), (MessageRole::User, "B")]
        );
    }

    #[tokio::test]
    async fn test_response_mapping_uses_timestamp_and_model() {
        let client = MockCompletion::default();
        let mut backend = ModelServerBackend::new(client.clone(), &config(&[], "intro", &[]));
        let greeting = backend.start().await.unwrap();

        assert_eq!(greeting.id, "2024-01-01T00:00:00Z");
        assert_eq!(greeting.chat_id, greeting.id);
        assert_eq!(greeting.character_id, "neural-chat");
        assert_eq!(greeting.src_name, "ollama-neural-chat");
        assert_eq!(greeting.image_relative_path.as_deref(), Some(""));
        assert_eq!(*client.temperatures.lock().unwrap(), vec![COMPLETION_TEMPERATURE]);
    }

    #[tokio::test]
    async fn test_receive_before_start_is_rejected() {
        let client = MockCompletion::default();
        let mut backend = ModelServerBackend::new(client.clone(), &config(&[], "intro", &[]));
        let err = backend.receive("hello").await.unwrap_err();
        assert!(matches!(err, BackendError::SessionNotStarted));
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_pull_failure_does_not_fail_initialize() {
        let client = MockCompletion {
            fail_pull: true,
            ..Default::default()
        };
        let backend = ModelServerBackend::initialize(client.clone(), &config(&[], "intro", &[])).await;
        assert_eq!(backend.model(), "neural-chat");
        assert_eq!(*client.pulls.lock().unwrap(), vec!["neural-chat".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_turn() {
        let ok_client = MockCompletion::default();
        let mut backend = ModelServerBackend::new(ok_client, &config(&[], "intro", &[]));
        backend.start().await.unwrap();
        backend.client.fail_chat = true;

        let err = backend.receive("lost?").await.unwrap_err();
        assert!(matches!(err, BackendError::Upstream { .. }));
        assert_eq!(backend.transcript().last().unwrap(), &Message::user("lost?"));
    }
}
