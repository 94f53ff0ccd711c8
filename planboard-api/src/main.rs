//! # Planboard API Server
//!
//! HTTP API for the Planboard project tracker, built with Axum:
//! - Login with transparent legacy-credential upgrade
//! - Projects with board-style status columns
//! - Task details, moves, assignees, comments, and attachments
//! - Profile management for the authenticated user
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p planboard-api
//! ```

use planboard_api::{app, config::Config};
use planboard_shared::db;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Planboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool
    let pool = db::pool::create_pool(db::pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    // Apply pending migrations
    db::migrations::run_migrations(&pool).await?;

    let addr = config.bind_address();
    let state = app::AppState::new(pool, config);
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
