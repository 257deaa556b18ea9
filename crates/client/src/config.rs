//! Codex client configuration.
//!
//! [`CodexConfig`] is built once per plugin session and handed to
//! [`CodexApi::new`](crate::api::CodexApi::new). All fields except the
//! plugin name have defaults suitable for the public Codex service.

use std::time::Duration;

use reqwest::Url;

/// Root of the public Codex plugin API.
pub const DEFAULT_BASE_URL: &str = "https://codex.aimsucks.space/api/v1/plugins";

/// Default `User-Agent` header sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("codex-client/", env!("CARGO_PKG_VERSION"));

/// Configuration for a single plugin's Codex client.
#[derive(Debug, Clone)]
pub struct CodexConfig {
    /// Service root, e.g. `https://host/api/v1/plugins`.
    pub base_url: String,
    /// Plugin name as it appears on Codex. Not URL-encoded.
    pub plugin_name: String,
    /// Whole-request timeout. `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

/// Errors raised while building configuration or the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),

    #[error("{name} has an invalid value: '{value}'")]
    InvalidVar { name: &'static str, value: String },

    #[error("Plugin name must not be empty")]
    EmptyPluginName,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl CodexConfig {
    /// Configuration for `plugin_name` against the public Codex service.
    pub fn new(plugin_name: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            plugin_name: plugin_name.into(),
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `CODEX_PLUGIN_NAME`          | -- (required)           |
    /// | `CODEX_BASE_URL`             | [`DEFAULT_BASE_URL`]    |
    /// | `CODEX_REQUEST_TIMEOUT_SECS` | unset (no timeout)      |
    /// | `CODEX_USER_AGENT`           | [`DEFAULT_USER_AGENT`]  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let plugin_name =
            lookup("CODEX_PLUGIN_NAME").ok_or(ConfigError::MissingVar("CODEX_PLUGIN_NAME"))?;

        let mut config = Self::new(plugin_name);

        if let Some(base_url) = lookup("CODEX_BASE_URL") {
            config.base_url = base_url;
        }

        if let Some(raw) = lookup("CODEX_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "CODEX_REQUEST_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        if let Some(user_agent) = lookup("CODEX_USER_AGENT") {
            config.user_agent = user_agent;
        }

        Ok(config)
    }

    /// Build `{base_url}/{plugin_name}`, escaping the plugin name as a
    /// single path segment.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        if self.plugin_name.is_empty() {
            return Err(ConfigError::EmptyPluginName);
        }

        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not have a query or fragment".to_string()));
        }

        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push(&self.plugin_name);

        Ok(url)
    }

    /// Build the shared HTTP client for this configuration.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}
