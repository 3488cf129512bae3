//! Meshcache node
//!
//! Serves cache groups over HTTP and routes misses to the owning peer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meshcache::{create_router, persistence, spawn_snapshot_task, AppState, Config, HttpPool, Registry};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the peer pool and the group registry
/// 4. Restore the persisted snapshot, then create the default group if absent
/// 5. Start the periodic snapshot task
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM stop serving and write a final snapshot
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meshcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Meshcache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, port={}, replicas={}",
        config.self_addr, config.peers, config.server_port, config.ring_replicas
    );

    let pool = Arc::new(HttpPool::new(
        config.self_addr.clone(),
        config.ring_replicas,
        Duration::from_millis(config.peer_timeout_ms),
    )?);
    pool.set_peers(config.cluster()).await;

    let registry = Arc::new(Registry::with_peers(pool));

    // Restore first so a persisted default group keeps its recorded budget
    if config.persistence_enabled {
        let restored = persistence::load(&registry, &config.persistence_path)
            .await
            .with_context(|| format!("loading {}", config.persistence_path.display()))?;
        info!("Restored {} groups from snapshot", restored);
    }
    registry
        .get_or_create(&config.default_group, config.default_group_bytes, None)
        .await?;

    let snapshot_handle = config.persistence_enabled.then(|| {
        spawn_snapshot_task(
            Arc::clone(&registry),
            config.persistence_path.clone(),
            config.persistence_interval,
        )
    });

    let app = create_router(AppState::from_config(Arc::clone(&registry), &config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    if let Some(handle) = snapshot_handle {
        handle.abort();
        warn!("Snapshot task aborted");
        match persistence::save(&registry, &config.persistence_path).await {
            Ok(count) => info!("Saved {} groups on shutdown", count),
            Err(e) => error!("Final snapshot failed: {:#}", e),
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
