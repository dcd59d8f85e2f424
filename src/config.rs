//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `JWT_SECRET` (required): HMAC secret used to sign access tokens
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` / `DATABASE_MIN_CONNECTIONS` (optional): pool bounds, 20 / 2
/// - `DATABASE_MAX_LIFETIME_SECONDS` (optional): connection recycle age, defaults to 1800
/// - `JWT_EXPIRATION_SECONDS` (optional): token lifetime, defaults to 86400
/// - `REDIS_URL` (optional): enables the movie listing cache when set
/// - `CACHE_TTL_SECONDS` (optional): lifetime of cached listings, defaults to 300
/// - `CORS_ALLOWED_ORIGIN` (optional): front-end origin, defaults to `http://localhost:5173`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub jwt_secret: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub database_min_connections: u32,

    #[serde(default = "default_max_lifetime")]
    pub database_max_lifetime_seconds: u64,

    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_seconds: i64,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    #[serde(default = "default_cors_origin")]
    pub cors_allowed_origin: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_max_lifetime() -> u64 {
    30 * 60
}

fn default_jwt_expiration() -> i64 {
    24 * 60 * 60
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL, JWT_SECRET)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    /// Build a configuration from an explicit list of variables.
    ///
    /// Same rules as [`Config::from_env`] without touching the process environment.
    pub fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn applies_defaults_for_optional_settings() {
        let config = Config::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/tickets"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_max_connections, 20);
        assert_eq!(config.database_min_connections, 2);
        assert_eq!(config.jwt_expiration_seconds, 86_400);
        assert!(config.redis_url.is_none());
        assert_eq!(config.cache_ttl_seconds, 300);
    }

    #[test]
    fn reads_redis_url_when_present() {
        let config = Config::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/tickets"),
            ("JWT_SECRET", "secret"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
            ("SERVER_PORT", "8888"),
        ]))
        .unwrap();

        assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
        assert_eq!(config.server_port, 8888);
    }

    #[test]
    fn rejects_missing_jwt_secret() {
        let result = Config::from_iter(vars(&[("DATABASE_URL", "postgres://localhost/tickets")]));
        assert!(result.is_err());
    }
}
