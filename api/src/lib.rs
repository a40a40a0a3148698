//! HTTP shell of the interview-prep app: settings, startup check, routes.

pub mod core;
pub mod error_handler;
mod middleware_layer;
pub mod routes;

use std::{env, path::PathBuf, sync::Arc};

use colored::Colorize;
use tokio::signal;
use tracing::{error, info};

use crate::{
    core::{
        app_settings::{AppSettings, DEFAULT_SETTINGS_PATH},
        app_state::{AppState, LlmRuntime},
        startup::{StartupState, failure_banner},
    },
    error_handler::{AppError, AppResult},
};

/// Address used when `API_ADDRESS` is unset.
pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:8501";

pub async fn start() -> AppResult<()> {
    let settings_path = env::var("APP_SETTINGS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH));
    let settings = AppSettings::load(&settings_path).await?;

    let state = AppState::initialize(settings, settings_path).await?;
    print_banner(&*state.runtime().await);

    let app = routes::router(Arc::new(state));

    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(|source| AppError::Bind {
            addr: host_url.clone(),
            source,
        })?;
    info!(address = %host_url, "listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

fn print_banner(runtime: &LlmRuntime) {
    let provider = runtime
        .provider()
        .map(|p| p.display_name())
        .unwrap_or("unknown provider");
    match &runtime.startup {
        StartupState::Ready => println!(
            "{} {} ({}, model {})",
            "✔".green().bold(),
            "LLM service ready".green(),
            provider,
            runtime.settings.llm_model.cyan()
        ),
        StartupState::Failed(reason) => {
            println!("{} {}", "✘".red().bold(), failure_banner(runtime.provider()).red());
            println!("  {}", reason.dimmed());
        }
        StartupState::Unchecked => println!("{}", "LLM service not checked".yellow()),
    }
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        // without a signal handler we never stop on our own
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
