// =============================================================================
// StockDeck — Main Entry Point
// =============================================================================
//
// Stock market analysis dashboard backend: account login, watchlists, price
// series with technical indicators, and chart specifications served over a
// REST API.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod charts;
mod indicators;
mod provider;
mod runtime_config;
mod store;
mod types;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::session::SessionKeys;
use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;
use crate::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        StockDeck Dashboard — Starting Up                ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = RuntimeConfig::load("runtime_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    if let Ok(addr) = std::env::var("STOCKDECK_BIND_ADDR") {
        config.bind_addr = addr;
    }
    if let Ok(path) = std::env::var("STOCKDECK_DB_PATH") {
        config.db_path = path;
    }

    // The session secret must come from the environment; a generated one
    // would invalidate all tokens on restart silently.
    let secret = std::env::var("STOCKDECK_SESSION_SECRET").unwrap_or_else(|_| {
        warn!("STOCKDECK_SESSION_SECRET is not set — using an insecure development secret");
        "stockdeck-dev-secret".to_string()
    });
    let session_keys = SessionKeys::new(secret.into_bytes(), config.session_max_age_secs);

    info!(
        bind_addr = %config.bind_addr,
        db_path = %config.db_path,
        trending = ?config.trending_symbols,
        "configuration resolved"
    );

    // ── 2. Open the store ────────────────────────────────────────────────
    let store = Store::open(&config.db_path)?;

    // ── 3. Build shared state ────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, store, session_keys));

    // ── 4. Serve the API ─────────────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {bind_addr}: {e}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await?;

    if let Err(e) = state.config.read().save("runtime_config.json") {
        warn!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("StockDeck shut down complete.");
    Ok(())
}
