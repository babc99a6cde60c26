//! Shared test utilities for studyplan integration tests.
//!
//! Provides:
//! - [`ScriptedProvider`]: a [`PlanProvider`] double that returns a fixed
//!   reply and counts how often it was called.
//! - Plan JSON fixtures.
//! - [`serve_stub`]: runs an axum router on an ephemeral local port, used
//!   to stand in for the real provider's HTTP API.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use studyplan_core::provider::{PlanProvider, ProviderError};

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

/// What a [`ScriptedProvider`] answers on every call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return this text as the provider output.
    Text(String),
    /// Fail with [`ProviderError::Transport`].
    Transport(String),
    /// Fail with [`ProviderError::Status`].
    Status(u16, String),
    /// Fail with [`ProviderError::Timeout`].
    Timeout,
}

/// Test double for [`PlanProvider`].
#[derive(Debug)]
pub struct ScriptedProvider {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Provider that answers with a valid plan of `entries` days.
    pub fn with_plan(entries: usize) -> Arc<Self> {
        Self::new(Reply::Text(sample_plan_json(entries)))
    }

    pub fn with_text(text: impl Into<String>) -> Arc<Self> {
        Self::new(Reply::Text(text.into()))
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Self::new(Reply::Transport(message.into()))
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl PlanProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, _schema: &Value) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());

        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Transport(msg) => Err(ProviderError::Transport(msg.clone())),
            Reply::Status(status, body) => Err(ProviderError::status(*status, body)),
            Reply::Timeout => Err(ProviderError::Timeout(Duration::from_secs(60))),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A schema-conformant plan value with `entries` schedule entries.
pub fn sample_plan(entries: usize) -> Value {
    let schedule: Vec<Value> = (1..=entries)
        .map(|i| {
            json!({
                "day": format!("Day {i}"),
                "topic": format!("Topic {i}: practice exercises"),
                "duration": "60 minutes",
            })
        })
        .collect();
    json!({
        "planTitle": "Your Focused Study Sprint",
        "summary": "A steady, realistic plan that fits your evenings.",
        "schedule": schedule,
    })
}

/// [`sample_plan`] serialized as provider text.
pub fn sample_plan_json(entries: usize) -> String {
    sample_plan(entries).to_string()
}

/// Wrap provider text in a Gemini `generateContent` response envelope.
pub fn gemini_envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

// ---------------------------------------------------------------------------
// Stub HTTP server
// ---------------------------------------------------------------------------

/// Serve `router` on `127.0.0.1:<ephemeral>` and return its base URL.
///
/// The server task runs until the test's runtime shuts down.
pub async fn serve_stub(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub listener");
    let addr = listener.local_addr().expect("stub listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("stub server failed");
    });
    format!("http://{addr}")
}
