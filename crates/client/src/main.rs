//! `codex-fetch` -- query a Codex server from the command line.
//!
//! With no arguments, prints the plugin's preset tree as JSON. With
//! arguments, treats them as preset ids and prints their current
//! versions.
//!
//! # Environment variables
//!
//! | Variable                     | Required | Default               |
//! |------------------------------|----------|-----------------------|
//! | `CODEX_PLUGIN_NAME`          | yes      | --                    |
//! | `CODEX_BASE_URL`             | no       | public Codex service  |
//! | `CODEX_REQUEST_TIMEOUT_SECS` | no       | transport default     |
//! | `CODEX_USER_AGENT`           | no       | `codex-client/<ver>`  |

use std::process::ExitCode;
use std::sync::Arc;

use codex_client::{Codex, CodexConfig, TracingLogSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codex_client=info,codex=error".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ids = match std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(error = %e, "Preset ids must be integers");
            return ExitCode::FAILURE;
        }
    };

    let codex = match CodexConfig::from_env()
        .and_then(|config| Codex::with_config(config, Arc::new(TracingLogSink)))
    {
        Ok(codex) => codex,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let output = if ids.is_empty() {
        codex
            .api()
            .fetch_preset_tree()
            .await
            .map(|tree| serde_json::to_string_pretty(&tree))
    } else {
        codex
            .api()
            .fetch_preset_updates(&ids)
            .await
            .map(|presets| serde_json::to_string_pretty(&presets))
    };

    codex.dispose().await;

    // The client has already logged request failures.
    match output {
        Ok(Ok(json)) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to serialize output");
            ExitCode::FAILURE
        }
        Err(_) => ExitCode::FAILURE,
    }
}
