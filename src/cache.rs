//! Optional Redis look-aside cache for read-heavy catalog endpoints.
//!
//! The cache never decides correctness: a miss, a decode failure or a Redis
//! outage all fall through to PostgreSQL, and write paths only ever delete keys.
//! Seat occupancy is never cached.

use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};

/// Key prefix of every cached movie listing.
pub const MOVIES_PREFIX: &str = "movies:";

/// Key of the cached upcoming list.
pub const UPCOMING_KEY: &str = "movies:upcoming";

/// Handle to the cache; cheap to clone.
///
/// Built with [`Cache::connect`] when `REDIS_URL` is configured, otherwise
/// [`Cache::disabled`], in which case every lookup is a miss.
#[derive(Clone)]
pub struct Cache {
    conn: Option<ConnectionManager>,
    ttl_seconds: u64,
}

impl Cache {
    /// Connect to Redis and verify the connection with a `PING`.
    pub async fn connect(url: &str, ttl_seconds: u64) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;

        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Redis cache connected");

        Ok(Self {
            conn: Some(conn),
            ttl_seconds,
        })
    }

    /// A cache that stores nothing.
    pub fn disabled() -> Self {
        Self {
            conn: None,
            ttl_seconds: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    /// Fetch and decode a cached value; `None` on miss or any failure.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone()?;

        let raw: Option<String> = match conn.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw?) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    /// Store a value with the configured TTL. Failures are logged and ignored.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache encode failed");
                return;
            }
        };

        let stored: Result<(), redis::RedisError> =
            conn.set_ex(key, payload, self.ttl_seconds).await;
        if let Err(e) = stored {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }

    /// Delete every key starting with `prefix` (`SCAN` + `DEL`).
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };

        if let Err(e) = delete_by_prefix(&mut conn, prefix).await {
            tracing::warn!(prefix, error = %e, "cache invalidation failed");
        }
    }

    /// `PING` the server; always `false` when the cache is disabled.
    pub async fn ping(&self) -> bool {
        let Some(mut conn) = self.conn.clone() else {
            return false;
        };
        let pong: Result<String, redis::RedisError> =
            redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }
}

async fn delete_by_prefix(
    conn: &mut ConnectionManager,
    prefix: &str,
) -> Result<(), redis::RedisError> {
    let pattern = format!("{prefix}*");
    let mut cursor: u64 = 0;

    loop {
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(&pattern)
            .arg("COUNT")
            .arg(100)
            .query_async(&mut *conn)
            .await?;

        if !keys.is_empty() {
            let _: () = conn.del(keys).await?;
        }

        if next == 0 {
            return Ok(());
        }
        cursor = next;
    }
}

/// Cache key of a movie listing query.
pub fn movies_key(search: &str, page: u32, limit: u32) -> String {
    format!(
        "{MOVIES_PREFIX}search={}&page={page}&limit={limit}",
        search.trim().to_lowercase()
    )
}

/// Cache key of a now-showing query; `genre_ids` must already be sorted.
pub fn now_showing_key(
    search: &str,
    genre_ids: &[i64],
    sort: &str,
    page: u32,
    limit: u32,
) -> String {
    let genres: Vec<String> = genre_ids.iter().map(i64::to_string).collect();
    format!(
        "{MOVIES_PREFIX}now-showing?search={}&genres={}&sort={sort}&page={page}&limit={limit}",
        search.trim().to_lowercase(),
        genres.join(","),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = Cache::disabled();
        cache.set_json("movies:x", &vec![1, 2, 3]).await;

        let cached: Option<Vec<i32>> = cache.get_json("movies:x").await;
        assert!(cached.is_none());
        assert!(!cache.is_enabled());
        assert!(!cache.ping().await);
    }

    #[test]
    fn listing_keys_share_prefix_and_ignore_search_case() {
        let a = movies_key(" Spider ", 1, 10);
        let b = movies_key("spider", 1, 10);

        assert_eq!(a, b);
        assert!(a.starts_with(MOVIES_PREFIX));
        assert_ne!(a, movies_key("spider", 2, 10));
    }

    #[test]
    fn showing_keys_fall_under_listing_prefix() {
        let key = now_showing_key("Dune", &[1, 3], "latest", 1, 12);

        assert_eq!(
            key,
            "movies:now-showing?search=dune&genres=1,3&sort=latest&page=1&limit=12"
        );
        assert!(UPCOMING_KEY.starts_with(MOVIES_PREFIX));
    }
}
