use anyhow::Context;
use tracing::{Level, info};

use blueprint_server::config::AppConfig;
use blueprint_server::state::AppState;
use blueprint_server::{build_router, database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load config")?;
    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    info!("Database schema synchronized");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState { db, config });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
