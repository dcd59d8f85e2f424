//! Integration tests for the Redis look-aside cache.
//!
//! Docker must be running. Each test starts its own Redis container (and
//! PostgreSQL where the HTTP layer is involved).

mod common;

use axum::http::StatusCode;
use common::*;
use movie_booking_server::{
    AppState, app,
    cache::{Cache, MOVIES_PREFIX, UPCOMING_KEY, movies_key},
    middleware::auth::TokenKeys,
    models::user::Role,
};
use redis::AsyncCommands;
use serde_json::json;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::{REDIS_PORT, Redis};

async fn start_redis() -> (ContainerAsync<Redis>, String) {
    let container = Redis::default()
        .start()
        .await
        .expect("Failed to start redis container");
    let port = container
        .get_host_port_ipv4(REDIS_PORT)
        .await
        .expect("Failed to get redis port");

    (container, format!("redis://127.0.0.1:{port}"))
}

/// Separate connection for inspecting what the cache wrote.
async fn inspector(url: &str) -> redis::aio::MultiplexedConnection {
    redis::Client::open(url)
        .unwrap()
        .get_multiplexed_async_connection()
        .await
        .expect("Failed to connect to redis")
}

#[tokio::test]
async fn values_round_trip_with_ttl() {
    let (_container, url) = start_redis().await;
    let cache = Cache::connect(&url, 120).await.expect("cache connects");
    let mut redis = inspector(&url).await;

    assert!(cache.is_enabled());
    assert!(cache.ping().await);

    let key = movies_key("dune", 1, 10);
    cache.set_json(&key, &vec!["Dune".to_string()]).await;

    let cached: Option<Vec<String>> = cache.get_json(&key).await;
    assert_eq!(cached, Some(vec!["Dune".to_string()]));

    let ttl: i64 = redis.ttl(&key).await.unwrap();
    assert!(ttl > 0 && ttl <= 120, "ttl was {ttl}");

    let missing: Option<Vec<String>> = cache.get_json("movies:nothing-here").await;
    assert!(missing.is_none());
}

#[tokio::test]
async fn undecodable_entry_is_a_miss() {
    let (_container, url) = start_redis().await;
    let cache = Cache::connect(&url, 60).await.unwrap();
    let mut redis = inspector(&url).await;

    let _: () = redis.set("movies:broken", "not json").await.unwrap();

    let cached: Option<Vec<i64>> = cache.get_json("movies:broken").await;
    assert!(cached.is_none());
}

#[tokio::test]
async fn prefix_invalidation_clears_every_listing_page_only() {
    let (_container, url) = start_redis().await;
    let cache = Cache::connect(&url, 300).await.unwrap();
    let mut redis = inspector(&url).await;

    // More keys than one SCAN batch
    for page in 1..=250 {
        cache.set_json(&movies_key("", page, 10), &page).await;
    }
    cache.set_json(UPCOMING_KEY, &Vec::<i64>::new()).await;
    let _: () = redis.set("other:x", "kept").await.unwrap();

    cache.invalidate_prefix(MOVIES_PREFIX).await;

    let remaining: Vec<String> = redis.keys(format!("{MOVIES_PREFIX}*")).await.unwrap();
    assert!(remaining.is_empty(), "left behind: {remaining:?}");

    let other: Option<String> = redis.get("other:x").await.unwrap();
    assert_eq!(other.as_deref(), Some("kept"));
}

#[tokio::test]
async fn movie_listing_is_cached_until_a_movie_is_created() {
    let (_pg, pool) = setup().await;
    let (_redis, url) = start_redis().await;
    seed_movie(&pool, "Dune").await;

    let tokens = TokenKeys::new("cache-secret", 3600);
    let admin = tokens
        .issue(seed_user(&pool).await, Role::Admin)
        .unwrap()
        .token;
    let cache = Cache::connect(&url, 300).await.unwrap();
    let router = app(AppState::new(pool.clone(), cache, tokens));

    let (status, body) = send(&router, get("/api/v1/movies", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["total"], 1);

    // Written behind the service's back: the cached page still wins
    seed_movie(&pool, "Barbie").await;
    let (_, body) = send(&router, get("/api/v1/movies", None)).await;
    assert_eq!(body["results"]["total"], 1);

    let (status, _) = send(
        &router,
        post_json(
            "/api/v1/movies",
            Some(&admin),
            json!({
                "title": "Oppenheimer",
                "release_date": "2023-07-21",
                "duration_minutes": 180
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&router, get("/api/v1/movies", None)).await;
    assert_eq!(body["results"]["total"], 3);
    let titles: Vec<&str> = body["results"]["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Dune", "Barbie", "Oppenheimer"]);
}

#[tokio::test]
async fn health_reports_connected_cache() {
    let (_pg, pool) = setup().await;
    let (_redis, url) = start_redis().await;
    let cache = Cache::connect(&url, 60).await.unwrap();
    let router = app(AppState::new(pool, cache, TokenKeys::new("s", 60)));

    let (status, body) = send(&router, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cache"], "connected");
}
