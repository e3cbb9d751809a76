//! Scoreboard Backend Server
//!
//! Entry point: configuration loading, task queue startup, HTTP serving and
//! drain-on-signal shutdown.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use scoreboard_config::Config;
use scoreboard_queue::TaskQueue;
use scoreboard_store::JsonFileStore;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use scoreboard_backend::build_router;
use scoreboard_backend::lifecycle::{build_runtime, run_bounded};
use scoreboard_backend::state::AppState;

mod cli;
mod config_helpers;
mod shutdown;
mod tracing_setup;

use cli::CliArgs;
use config_helpers::parse_bind_address;
use shutdown::shutdown_signal;
use tracing_setup::install_tracing_from_config;

fn main() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();

    let config = scoreboard_config::load_config(args.config_path.as_deref()).map_err(|e| {
        eprintln!("failed to load configuration: {e}");
        anyhow::anyhow!(e.to_string())
    })?;

    install_tracing_from_config(&config.logging);
    tracing::info!(
        store_path = %config.store.path,
        static_dir = %config.static_files.directory,
        grace_ms = config.shutdown.grace_period_ms,
        "configuration loaded"
    );

    let grace = config.shutdown.grace_period();
    run_bounded(build_runtime()?, grace, serve(config))
}

async fn serve(config: Config) -> anyhow::Result<ExitCode> {
    // The store handle moves into the queue worker; nothing else touches the file.
    let queue = TaskQueue::start(JsonFileStore::new(&config.store.path));
    let state = Arc::new(AppState::new(queue.clone()));
    let app = build_router(state, &config.static_files.directory);

    let addr = parse_bind_address(&config.server.host, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "scoreboard server listening");

    let stop = Arc::new(Notify::new());
    let server_stop = Arc::clone(&stop);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move { server_stop.notified().await })
            .await
    });

    tokio::select! {
        _ = shutdown_signal() => {}
        res = &mut server => {
            res??;
            anyhow::bail!("HTTP server stopped unexpectedly");
        }
    }

    // Stop taking connections, then give in-flight work the grace period to land.
    stop.notify_one();
    let grace = config.shutdown.grace_period();

    let exit = match queue.shutdown(grace).await {
        Ok(()) => {
            tracing::info!("task queue shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "forced shutdown");
            ExitCode::FAILURE
        }
    };

    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Ok(()))) => tracing::info!("HTTP server stopped"),
        Ok(Ok(Err(e))) => tracing::warn!(error = %e, "HTTP server stopped with error"),
        Ok(Err(e)) => tracing::warn!(error = %e, "HTTP server task failed"),
        Err(_) => tracing::warn!("HTTP server did not stop within the grace period"),
    }

    // Anything still running (a hung store write, a stuck connection) is
    // abandoned when the runtime is torn down within the grace period.
    Ok(exit)
}
