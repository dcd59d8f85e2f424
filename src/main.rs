//! Movie Booking Service - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Connect the optional Redis cache
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

use movie_booking_server::{
    AppState, app, cache::Cache, config::Config, cors_layer, db,
    middleware::auth::TokenKeys,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config).await?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "Database pool created"
    );

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // The cache is optional; the service runs without it
    let cache = match config.redis_url.as_deref() {
        Some(url) => match Cache::connect(url, config.cache_ttl_seconds).await {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, movie cache disabled");
                Cache::disabled()
            }
        },
        None => {
            tracing::info!("REDIS_URL not set, movie cache disabled");
            Cache::disabled()
        }
    };

    let tokens = TokenKeys::new(&config.jwt_secret, config.jwt_expiration_seconds);
    let state = AppState::new(pool, cache, tokens);

    let app = app(state).layer(cors_layer(&config.cors_allowed_origin)?);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
