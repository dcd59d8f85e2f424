//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a PostgreSQL connection pool
//! - Running database migrations automatically
//!
//! The pool is built once in `main` and handed to every component through
//! [`crate::state::AppState`]; nothing in the crate reaches for a global pool.

use std::time::Duration;

use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

use crate::config::Config;

/// Type alias for PostgreSQL connection pool.
///
/// Instead of writing `Pool<Postgres>` everywhere, we can use `DbPool`.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool sized from configuration.
///
/// # Configuration
///
/// - Maximum connections: `DATABASE_MAX_CONNECTIONS` (default 20)
/// - Minimum idle connections: `DATABASE_MIN_CONNECTIONS` (default 2)
/// - Connections are recycled after `DATABASE_MAX_LIFETIME_SECONDS`
///
/// # Errors
///
/// Returns an error if:
/// - Database connection string is invalid
/// - Cannot connect to PostgreSQL server
/// - Database authentication fails
pub async fn create_pool(config: &Config) -> Result<DbPool, sqlx::Error> {
    pool_options(config).connect(&config.database_url).await
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .max_lifetime(Duration::from_secs(config.database_max_lifetime_seconds))
        .acquire_timeout(Duration::from_secs(5))
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are tracked in the `_sqlx_migrations` table, so each file runs only once.
///
/// # Migration Files
///
/// Migration files live in `migrations/` with format `<timestamp>_<name>.sql`.
///
/// # Errors
///
/// Returns an error if:
/// - Migration files cannot be read
/// - SQL syntax errors in migration files
/// - Database errors during migration execution
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}
