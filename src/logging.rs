//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to both console and
//! files, so long-running monitor loops leave a JSON audit trail on disk
//! while the console stays human-readable. If the log directory cannot be
//! created, file output is dropped and the console layer still installs.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;

use chrono::Utc;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let console = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(EnvFilter::new(log_level.clone()));

        let (file_layer, log_path) = match open_log_file(&environment) {
            Ok((writer, guard, path)) => {
                // Keep the non-blocking writer alive for the process lifetime.
                std::mem::forget(guard);
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(EnvFilter::new(log_level));
                (Some(layer), Some(path))
            }
            Err(e) => {
                eprintln!("file logging disabled: {e}");
                (None, None)
            }
        };

        let subscriber = tracing_subscriber::registry().with(console).with(file_layer);

        // A global subscriber may already be set when embedded in tests.
        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }

        match log_path {
            Some(path) => tracing::info!(
                pid = process::id(),
                environment = %environment,
                log_file = %path.display(),
                "structured logging initialized"
            ),
            None => tracing::info!(
                pid = process::id(),
                environment = %environment,
                "structured logging initialized, console only"
            ),
        }
    });
}

/// Set up the per-process log file under `log/`.
fn open_log_file(environment: &str) -> std::io::Result<(NonBlocking, WorkerGuard, PathBuf)> {
    let log_dir = PathBuf::from("log");
    fs::create_dir_all(&log_dir)?;

    let pid = process::id();
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let log_filename = format!("{environment}.{pid}.{timestamp}.log");
    let log_path = log_dir.join(&log_filename);

    let file_appender = tracing_appender::rolling::never(&log_dir, log_filename);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    Ok((writer, guard, log_path))
}

/// Current environment from environment variables.
fn get_environment() -> String {
    std::env::var("FINTX_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Default log level for an environment, overridable via `RUST_LOG`.
fn get_log_level(environment: &str) -> String {
    if let Ok(level) = std::env::var("RUST_LOG") {
        return level;
    }
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}
