//! Shared helpers for Codex client integration tests.
//!
//! [`TestServer`] is an in-process Axum server standing in for Codex. It
//! records the raw path and query of every request and answers all of
//! them with one scripted [`Reply`].

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Router;

use codex_client::{CodexApi, CodexConfig, LogSink};

/// Plugin name used by tests that don't care about escaping.
pub const PLUGIN: &str = "Sloth";

/// Canned response served for every request.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
    /// Held before responding, after the request is recorded.
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct ServerState {
    requests: Arc<Mutex<Vec<String>>>,
    reply: Arc<Mutex<Reply>>,
}

pub struct TestServer {
    pub addr: SocketAddr,
    state: ServerState,
}

impl TestServer {
    /// Bind to an ephemeral port and serve `reply` until the test ends.
    pub async fn spawn(reply: Reply) -> Self {
        let state = ServerState {
            requests: Arc::default(),
            reply: Arc::new(Mutex::new(reply)),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Service root to put in [`CodexConfig::base_url`].
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1/plugins", self.addr)
    }

    /// Raw `path?query` of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.state.reply.lock().unwrap() = reply;
    }

    /// Wait until at least `n` requests have arrived.
    pub async fn wait_for_requests(&self, n: usize) {
        for _ in 0..200 {
            if self.state.requests.lock().unwrap().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("server did not receive {n} request(s)");
    }

    pub fn config(&self, plugin_name: &str) -> CodexConfig {
        CodexConfig::new(plugin_name).with_base_url(self.base_url())
    }

    /// A client for `plugin_name` pointed at this server, plus its log.
    pub fn api(&self, plugin_name: &str) -> (Arc<CodexApi>, Arc<RecordingLog>) {
        let log = Arc::new(RecordingLog::default());
        let api = CodexApi::new(&self.config(plugin_name), log.clone()).unwrap();
        (Arc::new(api), log)
    }
}

async fn handle(State(state): State<ServerState>, uri: Uri) -> (StatusCode, String) {
    state.requests.lock().unwrap().push(uri.to_string());

    let reply = state.reply.lock().unwrap().clone();
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (reply.status, reply.body)
}

/// Log sink that keeps every message for later assertions.
#[derive(Default)]
pub struct RecordingLog {
    messages: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl LogSink for RecordingLog {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// A two-level preset tree as the Codex server serializes it.
pub const TREE_JSON: &str = r#"[
  {
    "name": "Combat",
    "subcategories": [
      {
        "name": "Raids",
        "subcategories": null,
        "presets": [
          {
            "id": 12,
            "name": "Savage HUD",
            "description": "Compact layout",
            "version": 4,
            "updatedAt": "2024-06-01T09:15:00",
            "data": "H4sIAAAA"
          }
        ]
      }
    ],
    "presets": [
      {
        "id": 3,
        "name": "Default",
        "description": null,
        "version": 1,
        "updatedAt": "2024-02-11T20:00:00Z",
        "data": "{}"
      }
    ]
  },
  { "name": "Empty" }
]"#;

/// An updates response carrying presets 3 and 1.
pub const UPDATES_JSON: &str = r#"[
  {"id": 3, "name": "Default", "description": null, "version": 2,
   "updatedAt": "2024-07-01T00:00:00Z", "data": "{\"a\":1}"},
  {"id": 1, "name": "Minimal", "description": "Bare", "version": 9,
   "updatedAt": "2024-07-02T00:00:00Z", "data": ""}
]"#;
