//! Entry point for the `issue-assistant` HTTP server.

use anyhow::Context;
use clap::Parser;
use issue_assistant::cli_args::ServerArgs;
use issue_assistant::{AppState, Config, router};
use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal; real environment variables still apply.
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ServerArgs::parse();
    let config = Config::load(&args).context("configuration error")?;
    if config.github_token.is_none() {
        warn!("GitHub token not set, using anonymous API access");
    }

    let state = AppState::new(&config).context("failed to initialise clients")?;
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        "listening on {} using model {}",
        config.bind,
        state.llm.model()
    );

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}
