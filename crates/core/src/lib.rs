//! Data model for Codex preset catalogs.
//!
//! Categories, presets and caller-side preset metadata as served by the
//! Codex REST API, plus pure helpers over them. No I/O lives here; the
//! HTTP layer is in `codex-client`.

pub mod preset;
pub mod types;
