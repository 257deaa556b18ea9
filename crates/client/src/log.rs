//! Error log sink supplied by the host plugin.

/// Receives the full detail of every failed Codex request.
pub trait LogSink: Send + Sync {
    fn error(&self, message: &str);
}

/// Forwards to [`tracing::error!`] under the `codex` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn error(&self, message: &str) {
        tracing::error!(target: "codex", "{message}");
    }
}
