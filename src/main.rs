//! Fanout Cache - A replicated member cache
//!
//! Serves the member cache API over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fanout_cache::api::create_router;
use fanout_cache::tasks::spawn_purge_task;
use fanout_cache::{bootstrap, Config};

/// Seconds between purges of expired in-memory entries.
const PURGE_INTERVAL_SECS: u64 = 1;

/// Main entry point for the member cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build cache nodes, fan-out repository and service
/// 4. Start the purge task when nodes live in memory
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM, stop serving and drain queued cache writes
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fanout_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fanout Cache Server");

    let config = Config::from_env().context("loading configuration")?;
    info!(
        "Configuration loaded: nodes={:?}, backend={:?}, ttl={}s, per_delta={}ms, per_beta={}, timeout={}ms, write_mode={:?}, port={}",
        config.nodes,
        config.backend,
        config.member_ttl,
        config.per_delta_ms,
        config.per_beta,
        config.command_timeout_ms,
        config.write_mode,
        config.server_port
    );

    let boot = bootstrap(&config).context("building cache nodes")?;

    let purge_handle = if boot.memory_nodes.is_empty() {
        None
    } else {
        info!("Background purge task started");
        Some(spawn_purge_task(boot.memory_nodes.clone(), PURGE_INTERVAL_SECS))
    };

    let app = create_router(boot.state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    if let Some(handle) = purge_handle {
        handle.abort();
        warn!("Purge task aborted");
    }

    let processed = boot.writer.drain().await;
    info!(processed, "Write queue drained, server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
