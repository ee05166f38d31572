//! Robur HTTP server binary.
//!
//! # Environment variables
//!
//! - `DATABASE_URL`: SQLite database (default: `sqlite:robur.db`)
//! - `HOST`: server host (default: 0.0.0.0)
//! - `PORT`: server port (default: 8080)
//! - `RUST_LOG`: log filter (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use robur_domain::Service;
use robur_storage::SqliteStorage;
use robur_web_app::{AppState, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:robur.db".to_string());
    let storage = SqliteStorage::connect(&database_url)
        .await
        .map_err(|err| anyhow::anyhow!("failed to open database: {err}"))?;
    info!("database ready: {database_url}");

    let state = AppState::new(Service::new(storage));
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
