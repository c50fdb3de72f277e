//! Cache Proxy - A forwarding HTTP proxy with an in-memory object cache
//!
//! Usage: `cache_proxy <port>`

use std::net::SocketAddr;
use std::process::ExitCode;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_proxy::{spawn_stats_task, Config, ProxyState, Server};

/// Main entry point for the caching proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Read the port argument and environment configuration
/// 3. Create the shared object cache
/// 4. Start the periodic stats task
/// 5. Accept connections until SIGINT/SIGTERM
///
/// SIGPIPE is already ignored by the Rust runtime, so a client that hangs up
/// mid-write only fails its own connection.
#[tokio::main]
async fn main() -> ExitCode {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_proxy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_args(std::env::args()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        "Configuration loaded: port={}, max_cache_size={}, max_object_size={}, max_connections={}, connect_timeout={}s",
        config.port,
        config.max_cache_size,
        config.max_object_size,
        config.max_connections,
        config.connect_timeout
    );

    let state = ProxyState::from_config(&config);

    let stats_handle = (config.stats_interval > 0)
        .then(|| spawn_stats_task(state.cache.clone(), config.stats_interval));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let server = Server::bind(addr, state, config.connection_limit())
        .await
        .with_context(|| format!("failed to listen on port {}", config.port))?;
    info!("Proxy listening on {}", addr);

    server.run(shutdown_signal(stats_handle)).await;

    info!("Proxy shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the stats task.
async fn shutdown_signal(stats_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
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

    if let Some(handle) = stats_handle {
        handle.abort();
        warn!("Stats task aborted");
    }
}
