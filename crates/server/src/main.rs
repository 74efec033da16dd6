use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod accessibility;
mod auth;
mod coaches;
mod config;
mod db;
mod error;
mod history;
mod openai;
mod pipeline;
mod routes;
mod state;
mod visual;

#[cfg(test)]
mod testing;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY and friends from a local .env
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "balance_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!(
        "Starting balance server on {}:{}",
        config.server.host,
        config.server.port
    );
    if config.openai.primary_key().is_none() && config.openai.azure.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; chat and assistant routes will fail");
    }

    // Initialize database
    let db = db::Database::new(&config.database.path, config.database.max_connections).await?;
    db.run_migrations().await?;
    coaches::seed(&db).await?;
    tracing::info!("Seeded {} coaches", coaches::all().len());

    for (pair, result) in accessibility::brand_contrast() {
        tracing::debug!("Brand contrast {}: {} ({:?})", pair, result.ratio, result.level);
    }

    // Create app state
    let state = AppState::new(db, config.clone());

    // Build router
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
