//! Codex REST client library.
//!
//! Fetches preset categories and version-tagged preset updates for a
//! plugin from the Codex service. [`lifecycle::Codex`] binds the plugin
//! name and log sink once; [`api::CodexApi`] performs the queries.

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod log;

pub use api::{CodexApi, CodexApiError};
pub use config::{CodexConfig, ConfigError};
pub use lifecycle::{Codex, PluginHost};
pub use log::{LogSink, TracingLogSink};

pub use codex_core::preset::{Category, Preset, PresetMetadata, PresetRecord};
