//! Shared application state.
//!
//! Built once at startup and cloned into every handler. Owning the pool here is
//! what replaces a process-global connection pool: its lifetime is the server's.

use axum::extract::FromRef;

use crate::{cache::Cache, db::DbPool, middleware::auth::TokenKeys};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub cache: Cache,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(pool: DbPool, cache: Cache, tokens: TokenKeys) -> Self {
        Self {
            pool,
            cache,
            tokens,
        }
    }
}

/// Lets handlers that only touch the database extract `State<DbPool>`.
impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
