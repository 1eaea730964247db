//! Router-level tests for the parley gateway.
//!
//! Each test builds its own router around a fresh backend and drives it with
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use parley_api::http::router::build_router;
use parley_api::state::AppState;
use parley_core::backend::box_backend::BoxChatBackend;
use parley_core::backend::chat_backend::ChatBackend;
use parley_core::backend::echo::EchoBackend;
use parley_types::chat::ChatResponse;
use parley_types::error::BackendError;

// =============================================================================
// Helpers
// =============================================================================

fn echo_app() -> (axum::Router, AppState) {
    let state = AppState::new(BoxChatBackend::new(EchoBackend::new()));
    (build_router(state.clone()), state)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn call(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

/// Backend whose every call fails with a fixed error kind.
struct FailingBackend {
    kind: &'static str,
}

impl FailingBackend {
    fn error(&self) -> BackendError {
        match self.kind {
            "upstream" => BackendError::Upstream {
                message: "connection refused".to_string(),
            },
            "malformed" => BackendError::MalformedResponse("missing message".to_string()),
            _ => BackendError::SessionNotStarted,
        }
    }
}

impl ChatBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn start(&mut self) -> Result<ChatResponse, BackendError> {
        Err(self.error())
    }

    async fn receive(&mut self, _message: &str) -> Result<ChatResponse, BackendError> {
        Err(self.error())
    }
}

/// Backend that detects overlapping calls.
struct OverlapProbe {
    busy: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
    calls: usize,
}

impl ChatBackend for OverlapProbe {
    fn name(&self) -> &str {
        "probe"
    }

    async fn start(&mut self) -> Result<ChatResponse, BackendError> {
        self.receive("").await
    }

    async fn receive(&mut self, message: &str) -> Result<ChatResponse, BackendError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.calls += 1;
        self.busy.store(false, Ordering::SeqCst);
        Ok(ChatResponse {
            id: self.calls.to_string(),
            character_id: "probe".to_string(),
            chat_id: "0".to_string(),
            image_relative_path: None,
            src_name: "probe".to_string(),
            text: message.to_string(),
        })
    }
}

// =============================================================================
// Echo round trips
// =============================================================================

#[tokio::test]
async fn echo_start_send_restart_scenario() {
    let (app, _) = echo_app();

    let (status, first) = call(&app, get("/start")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], "0");
    assert_eq!(first["chatId"], "0");
    assert_eq!(first["text"], "welcome to the echo chamber.");

    let (status, reply) = call(&app, post_json("/send", r#"{"message":"hi"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["id"], "1");
    assert_eq!(reply["chatId"], "0");
    assert_eq!(reply["text"], "hi");

    let (_, second) = call(&app, get("/start")).await;
    assert_eq!(second["id"], "1");
    assert_eq!(second["chatId"], "1");
}

#[tokio::test]
async fn response_always_carries_all_six_fields() {
    let (app, _) = echo_app();
    let (_, body) = call(&app, get("/start")).await;
    let obj = body.as_object().unwrap();
    for key in ["id", "characterId", "chatId", "imageRelativePath", "srcName", "text"] {
        assert!(obj.contains_key(key), "missing {key}");
    }
    assert!(obj["imageRelativePath"].is_null());
    assert_eq!(obj["characterId"], "echo-backend");
    assert_eq!(obj["srcName"], "echo-backend");
}

#[tokio::test]
async fn send_without_message_field_echoes_empty_string() {
    let (app, _) = echo_app();
    call(&app, get("/start")).await;
    let (status, reply) = call(&app, post_json("/send", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["text"], "");
}

#[tokio::test]
async fn send_with_invalid_json_is_client_error() {
    let (app, _) = echo_app();
    let response = app
        .clone()
        .oneshot(post_json("/send", "not json"))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn health_names_backend() {
    let (app, _) = echo_app();
    let (status, body) = call(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "echo");
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let state = AppState::new(BoxChatBackend::new(FailingBackend { kind: "upstream" }));
    let app = build_router(state);

    let (status, body) = call(&app, get("/start")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn malformed_response_maps_to_bad_gateway() {
    let state = AppState::new(BoxChatBackend::new(FailingBackend { kind: "malformed" }));
    let app = build_router(state);

    let (status, body) = call(&app, post_json("/send", r#"{"message":"x"}"#)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "MALFORMED_UPSTREAM_RESPONSE");
}

#[tokio::test]
async fn session_not_started_maps_to_conflict() {
    let state = AppState::new(BoxChatBackend::new(FailingBackend { kind: "state" }));
    let app = build_router(state);

    let (status, body) = call(&app, post_json("/send", r#"{"message":"x"}"#)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "SESSION_NOT_STARTED");
}

// =============================================================================
// Serialization of concurrent calls
// =============================================================================

#[tokio::test]
async fn concurrent_requests_never_overlap_on_the_backend() {
    let overlaps = Arc::new(AtomicUsize::new(0));
    let probe = OverlapProbe {
        busy: Arc::new(AtomicBool::new(false)),
        overlaps: Arc::clone(&overlaps),
        calls: 0,
    };
    let app = build_router(AppState::new(BoxChatBackend::new(probe)));

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = format!(r#"{{"message":"m{i}"}}"#);
            app.oneshot(post_json("/send", &body)).await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
}
