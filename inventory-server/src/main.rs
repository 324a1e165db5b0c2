//! Serves the inventory API over HTTP against PostgreSQL.
//!
//! Reads `DATABASE_URL`, `HOST`, `PORT`, `MAX_BODY_BYTES` and `DB_MAX_CONNECTIONS` from the
//! environment or a `.env` file. The schema is expected to exist already.

use inventory_api::{app, AppState, Repositories, ServerConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("inventory_api=info,inventory_server=info,tower_http=info")
            }),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    let state = AppState::new(Repositories::postgres(pool.clone()));
    let router = app(state, config.max_body_bytes);

    let listener = TcpListener::bind(config.addr()?).await?;
    tracing::info!(addr = %listener.local_addr()?, "inventory server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("inventory server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
