//! REST API client for the Codex preset endpoints.
//!
//! Wraps `GET {base}/{plugin}/presets` and
//! `GET {base}/{plugin}/updates?query=...` using [`reqwest`]. Every
//! network-path failure is reported to the plugin's [`LogSink`] once and
//! then returned to the caller unchanged.

use std::sync::Arc;

use codex_core::preset::{format_id_query, metadata_ids, Category, Preset, PresetRecord};
use codex_core::types::PresetId;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::{CodexConfig, ConfigError};
use crate::log::LogSink;

/// HTTP client for one plugin's Codex endpoints.
///
/// Safe to share across tasks behind an `Arc`; any number of queries may
/// be in flight at once. After [`close`](Self::close) every query fails
/// with [`CodexApiError::Closed`] without touching the network.
pub struct CodexApi {
    /// `None` once closed.
    client: RwLock<Option<reqwest::Client>>,
    /// `{base}/{escaped plugin name}`, computed once.
    api_url: Url,
    log: Arc<dyn LogSink>,
    /// Tracks in-flight queries so shutdown can wait for them.
    in_flight: TaskTracker,
    /// Cancelled by [`abort`](Self::abort).
    cancel: CancellationToken,
}

impl std::fmt::Debug for CodexApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodexApi")
            .field("api_url", &self.api_url.as_str())
            .field("closed", &self.is_closed())
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

/// Errors from the Codex REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum CodexApiError {
    /// The caller supplied no preset ids. No request was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Codex returned a non-2xx status code.
    #[error("Codex API error ({status}): {body}")]
    RequestFailure {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("Failed to deserialize Codex response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The query was cancelled by [`CodexApi::abort`].
    #[error("Request cancelled")]
    Cancelled,

    /// The client has been closed.
    #[error("Codex client is closed")]
    Closed,
}

impl CodexApi {
    /// Create a client with its own connection pool.
    pub fn new(config: &CodexConfig, log: Arc<dyn LogSink>) -> Result<Self, ConfigError> {
        Self::with_client(config.http_client()?, config, log)
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for sharing one connection pool across several plugins).
    ///
    /// Only the URL fields of `config` are used; `request_timeout` and
    /// `user_agent` are ignored in favour of `client`'s own settings.
    pub fn with_client(
        client: reqwest::Client,
        config: &CodexConfig,
        log: Arc<dyn LogSink>,
    ) -> Result<Self, ConfigError> {
        let api_url = config.api_url()?;

        tracing::debug!(api_url = %api_url, "Codex client created");

        Ok(Self {
            client: RwLock::new(Some(client)),
            api_url,
            log,
            in_flight: TaskTracker::new(),
            cancel: CancellationToken::new(),
        })
    }

    /// `{base}/{escaped plugin name}` that every endpoint hangs off.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Whether [`close`](Self::close) or [`abort`](Self::abort) has run.
    pub fn is_closed(&self) -> bool {
        self.in_flight.is_closed()
    }

    /// Fetch the plugin's full category tree.
    ///
    /// Sends `GET /presets`. Returns `Ok(None)` when the body is empty or
    /// JSON `null`, which is distinct from an empty tree.
    pub async fn fetch_preset_tree(&self) -> Result<Option<Vec<Category>>, CodexApiError> {
        let url = self.endpoint("presets", None);
        self.get_json(url).await
    }

    /// Fetch the current version of each given preset.
    ///
    /// Sends `GET /updates?query=<ids>` with the ids comma-joined in
    /// input order. An empty, `null` or `[]` body yields an empty list.
    /// Fails with [`CodexApiError::InvalidArgument`] before any request
    /// when `preset_ids` is empty.
    pub async fn fetch_preset_updates(
        &self,
        preset_ids: &[PresetId],
    ) -> Result<Vec<Preset>, CodexApiError> {
        if preset_ids.is_empty() {
            return Err(CodexApiError::InvalidArgument(
                "At least one preset ID must be provided.".to_string(),
            ));
        }

        let query = format!("query={}", format_id_query(preset_ids));
        let url = self.endpoint("updates", Some(&query));

        Ok(self.get_json(url).await?.unwrap_or_default())
    }

    /// Fetch updates for every record that was installed from a preset.
    ///
    /// Records without metadata are skipped. If none remain this fails
    /// exactly like [`fetch_preset_updates`](Self::fetch_preset_updates)
    /// with an empty list.
    pub async fn fetch_preset_updates_for<T: PresetRecord>(
        &self,
        records: &[T],
    ) -> Result<Vec<Preset>, CodexApiError> {
        self.fetch_preset_updates(&metadata_ids(records)).await
    }

    /// Release the connection once every in-flight query has finished.
    ///
    /// New queries fail with [`CodexApiError::Closed`] as soon as this is
    /// called. Calling it again is a no-op.
    pub async fn close(&self) {
        self.in_flight.close();
        let client = self.client.write().await.take();

        self.in_flight.wait().await;

        if client.is_some() {
            tracing::debug!(api_url = %self.api_url, "Codex client closed");
        }
    }

    /// Cancel in-flight queries, then [`close`](Self::close).
    ///
    /// Cancelled queries fail with [`CodexApiError::Cancelled`].
    pub async fn abort(&self) {
        self.cancel.cancel();
        self.close().await;
    }

    // ---- private helpers ----

    /// `{api_url}/{segment}` with an optional raw query string.
    fn endpoint(&self, segment: &str, query: Option<&str>) -> Url {
        let mut url = self.api_url.clone();
        // `api_url` was validated as a base URL in the constructor.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(segment);
        }
        url.set_query(query);
        url
    }

    /// Run one tracked GET, logging any network-path failure.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, CodexApiError> {
        self.in_flight
            .track_future(async {
                let client = self
                    .client
                    .read()
                    .await
                    .clone()
                    .ok_or(CodexApiError::Closed)?;

                let result = tokio::select! {
                    _ = self.cancel.cancelled() => Err(CodexApiError::Cancelled),
                    result = Self::send_get(&client, &url) => result,
                };

                if let Err(e) = &result {
                    self.log.error(&format!("GET {url} failed: {}", error_chain(e)));
                }
                result
            })
            .await
    }

    async fn send_get<T: DeserializeOwned>(
        client: &reqwest::Client,
        url: &Url,
    ) -> Result<Option<T>, CodexApiError> {
        tracing::debug!(url = %url, "Sending Codex request");

        let response = client.get(url.clone()).send().await?;

        tracing::debug!(url = %url, status = response.status().as_u16(), "Codex responded");

        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await?;
        Self::decode_body(&body)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a
    /// [`CodexApiError::RequestFailure`] with the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CodexApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CodexApiError::RequestFailure {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Decode a JSON body, mapping an empty body or `null` to `None`.
    fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, CodexApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(serde_json::from_slice::<Option<T>>(body)?)
    }
}

/// Display an error followed by each of its sources, skipping sources
/// whose text the message already contains.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
