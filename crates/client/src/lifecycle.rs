//! Plugin session lifecycle.
//!
//! [`Codex`] is created once when the host loads the plugin and disposed
//! when it unloads. It owns the plugin name and the [`CodexApi`] built
//! from it, so there is no window in which a query can run against an
//! uninitialized name.

use std::sync::Arc;

use crate::api::CodexApi;
use crate::config::{CodexConfig, ConfigError};
use crate::log::LogSink;

/// Services the host plugin runtime provides to Codex.
pub trait PluginHost {
    /// Sink that receives request failures.
    fn log_sink(&self) -> Arc<dyn LogSink>;
}

/// Handle for one plugin's Codex session.
#[derive(Debug)]
pub struct Codex {
    plugin_name: String,
    api: Arc<CodexApi>,
}

impl Codex {
    /// Initialize Codex for `plugin_name` against the public service,
    /// logging failures through the host's sink.
    ///
    /// `plugin_name` is the name as it appears on Codex; it does not need
    /// to be URL-encoded.
    pub fn initialize<H: PluginHost + ?Sized>(
        host: &H,
        plugin_name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::initialize_with(host, CodexConfig::new(plugin_name))
    }

    /// Initialize Codex with explicit configuration, logging failures
    /// through the host's sink.
    pub fn initialize_with<H: PluginHost + ?Sized>(
        host: &H,
        config: CodexConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_config(config, host.log_sink())
    }

    /// Initialize Codex with explicit configuration.
    pub fn with_config(config: CodexConfig, log: Arc<dyn LogSink>) -> Result<Self, ConfigError> {
        let api = CodexApi::new(&config, log)?;

        tracing::info!(plugin = %config.plugin_name, api_url = %api.api_url(), "Codex initialized");

        Ok(Self {
            plugin_name: config.plugin_name,
            api: Arc::new(api),
        })
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Shared query client; clone the `Arc` into tasks as needed.
    pub fn api(&self) -> &Arc<CodexApi> {
        &self.api
    }

    /// Close the client once in-flight queries finish. Call on unload.
    pub async fn dispose(self) {
        self.api.close().await;
        tracing::info!(plugin = %self.plugin_name, "Codex disposed");
    }
}
