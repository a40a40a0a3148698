use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing::{Level, info};
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ai_llm_service::telemetry;

/// Directory for `app.log` when `LOG_DIR` is unset.
const DEFAULT_LOG_DIR: &str = "logs";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables win.
    let dotenv = dotenvy::dotenv().ok();

    let log_dir = env::var("LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR));
    let _guard = init_tracing(&log_dir)?;

    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }
    info!(log_file = %log_dir.join("app.log").display(), "logging to console and file");

    api::start().await.context("interview prep server failed")?;

    Ok(())
}

/// Non-blocking writer appending to `{log_dir}/app.log`, creating the directory.
fn log_file_writer(log_dir: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("failed to open log file in {}", log_dir.display()))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Console output plus `{log_dir}/app.log`. The guard flushes the file on drop.
fn init_tracing(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    let (file_writer, guard) = log_file_writer(log_dir)?;

    let filter = telemetry::env_filter_with_level("info,tower_http=info", Level::INFO);
    let app_layer = fmt::layer()
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| {
            !meta.target().starts_with(telemetry::TARGET_PREFIX)
        }));
    let file_layer = fmt::layer().with_ansi(false).with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(app_layer)
        .with(telemetry::layer())
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_file_is_created_under_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let (mut writer, guard) = log_file_writer(&log_dir).unwrap();
        writer.write_all(b"settings loaded\n").unwrap();
        drop(guard);

        let written = std::fs::read_to_string(log_dir.join("app.log")).unwrap();
        assert!(written.contains("settings loaded"));
    }
}
