//! # SellerBox Server
//!
//! HTTP server for the SellerBox inventory and sales UI.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Server Startup                                  │
//! │                                                                         │
//! │  1. Load Configuration                                                  │
//! │     • TOML file ($SELLERBOX_CONFIG or platform config dir)              │
//! │     • SELLERBOX_* environment overrides                                 │
//! │                                                                         │
//! │  2. Initialize Logging                                                  │
//! │     • tracing-subscriber with env filter                                │
//! │     • RUST_LOG wins over [logging] filter                               │
//! │                                                                         │
//! │  3. Open Storage                                                        │
//! │     • memory: fresh MemoryStore                                         │
//! │     • sqlite: pool (WAL) + pending migrations                           │
//! │                                                                         │
//! │  4. Serve until Ctrl+C / SIGTERM, then close the pool                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sellerbox_db::Database;
use sellerbox_web::{build_app, AppState, StorageBackend, WebConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WebConfig::load(None).context("Failed to load configuration")?;

    init_tracing(&config.logging.filter);

    info!(
        backend = %config.storage.backend,
        port = config.server.port,
        "Starting SellerBox server"
    );

    let state = open_state(&config).await?;

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, build_app(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(db) = state.database() {
        db.close().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=sellerbox=trace` - Show trace for sellerbox crates only
/// - Default: the `[logging] filter` value
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

async fn open_state(config: &WebConfig) -> anyhow::Result<AppState> {
    let threshold = config.inventory.low_stock_threshold;

    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on exit");
            Ok(AppState::in_memory(threshold))
        }
        StorageBackend::Sqlite => {
            let db_config = config.storage.db_config();
            if let Some(parent) = db_config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create data directory {}", parent.display())
                    })?;
                }
            }

            let db = Database::new(db_config)
                .await
                .context("Failed to open database")?;
            info!("Database connected and migrations applied");
            Ok(AppState::sqlite(db, threshold))
        }
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
