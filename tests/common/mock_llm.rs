//! Scripted OpenAI-compatible chat completions endpoint
//!
//! Serves queued responses in order and records every request body, so
//! agent tests can run the real HTTP provider end to end.

#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
struct Script {
    responses: VecDeque<Value>,
    requests: Vec<Value>,
}

pub struct MockLlm {
    /// Base URL to hand to the provider, including the `/v1` prefix.
    pub base_url: String,
    script: Arc<Mutex<Script>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

/// Completion that answers with plain text.
pub fn answer(content: &str) -> Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}

/// Completion that asks for a single tool call.
pub fn tool_call(id: &str, name: &str, arguments: Value) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": id,
                    "type": "function",
                    "function": { "name": name, "arguments": arguments.to_string() }
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
}

async fn chat_completions(
    State(script): State<Arc<Mutex<Script>>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut script = script.lock().unwrap();
    script.requests.push(body);
    match script.responses.pop_front() {
        Some(response) => (StatusCode::OK, Json(response)),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "message": "script exhausted" } })),
        ),
    }
}

impl MockLlm {
    pub async fn spawn(responses: Vec<Value>) -> Self {
        let script = Arc::new(Mutex::new(Script {
            responses: responses.into(),
            requests: Vec::new(),
        }));

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(script.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock LLM");
        let port = listener.local_addr().expect("No local address").port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock LLM failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}/v1", port),
            script,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Request bodies received so far, oldest first.
    pub fn requests(&self) -> Vec<Value> {
        self.script.lock().unwrap().requests.clone()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
