//! # Talleres API Server
//!
//! REST backend for a workshops platform:
//! - Session management (register, login, logout, profile) with JWT
//!   identity tokens in an HttpOnly cookie or bearer header
//! - Public workshop catalog with admin-managed entries and images
//! - Per-user enrollment ledger with at most one enrollment per
//!   (user, workshop) pair
//! - Editable singleton homepage content
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p talleres-api
//! ```

use talleres_api::{
    app::{build_router, AppState},
    config::Config,
};
use talleres_shared::db::{migrations::run_migrations, pool::create_pool, pool::DatabaseConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talleres_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Talleres API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
