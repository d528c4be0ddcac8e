use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gateone_api::app::{router, AppState};
use gateone_api::config;
use gateone_api::database::DatabaseManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let cfg = config::config();
    tracing::info!("Starting GateOne API in {:?} mode", cfg.environment);

    let pool = DatabaseManager::connect(&cfg.database)
        .await
        .context("connecting to database")?;
    DatabaseManager::status_check(&pool, 10)
        .await
        .context("waiting for database")?;

    if cfg.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("running migrations")?;
    }

    let state = AppState::new(cfg, pool).context("building application state")?;
    let app = router(state, cfg);

    let bind_addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("GateOne API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server")?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown started");
}
