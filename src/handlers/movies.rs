//! Movie catalog HTTP handlers.
//!
//! - GET /api/v1/movies - Paginated listing with title search (cached)
//! - GET /api/v1/movies/now-showing - Released movies with genre filter and sort (cached)
//! - GET /api/v1/movies/upcoming - Movies not yet released (cached)
//! - GET /api/v1/movies/:id - One movie with genres, directors and cast
//! - POST /api/v1/movies - Add a movie (admin)
//! - POST /api/v1/movies/add-genre - Link a genre to a movie (admin)
//! - DELETE /api/v1/movies/:id - Remove a movie without bookings (admin)

use crate::{
    cache::{MOVIES_PREFIX, UPCOMING_KEY, movies_key, now_showing_key},
    error::AppError,
    middleware::auth::AuthContext,
    models::movie::{
        AddGenreRequest, CreateMovieRequest, Movie, MovieDetail, MovieListQuery, MoviePage,
        ShowingMovie, ShowingPage, ShowingQuery,
    },
    response::ApiResponse,
    services::movie_service::{self, ShowingFilter},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// List movies.
///
/// # Endpoint
///
/// `GET /api/v1/movies?search=spider&page=1&limit=10`
///
/// Served from the cache when a fresh entry exists; otherwise read from
/// PostgreSQL and stored for the configured TTL.
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieListQuery>,
) -> Result<Json<ApiResponse<MoviePage>>, AppError> {
    let (search, page, limit) = movie_service::page_params(&query);
    let key = movies_key(&search, page, limit);

    if let Some(cached) = state.cache.get_json::<MoviePage>(&key).await {
        tracing::debug!(key = %key, "movie listing served from cache");
        return Ok(Json(ApiResponse::ok("List movies", cached)));
    }

    let movies = movie_service::list_movies(&state.pool, &search, page, limit).await?;
    state.cache.set_json(&key, &movies).await;

    Ok(Json(ApiResponse::ok("List movies", movies)))
}

/// Movies released on or before today.
///
/// # Endpoint
///
/// `GET /api/v1/movies/now-showing?search=dune&genres=1,3&sort=name-asc&page=1&limit=12`
///
/// `sort` is `latest` (default), `name-asc` or `name-desc`; anything else
/// orders by id. A movie matches `genres` if it has any of the listed ids.
pub async fn now_showing(
    State(state): State<AppState>,
    Query(query): Query<ShowingQuery>,
) -> Result<Json<ApiResponse<ShowingPage>>, AppError> {
    let filter = ShowingFilter::from_query(&query);
    let key = now_showing_key(
        &filter.search,
        &filter.genre_ids,
        filter.sort.as_str(),
        filter.page,
        filter.limit,
    );

    if let Some(cached) = state.cache.get_json::<ShowingPage>(&key).await {
        tracing::debug!(key = %key, "now showing served from cache");
        return Ok(Json(ApiResponse::ok("Now showing", cached)));
    }

    let movies = movie_service::now_showing(&state.pool, &filter).await?;
    state.cache.set_json(&key, &movies).await;

    Ok(Json(ApiResponse::ok("Now showing", movies)))
}

/// `GET /api/v1/movies/upcoming`
pub async fn upcoming(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ShowingMovie>>>, AppError> {
    if let Some(cached) = state.cache.get_json::<Vec<ShowingMovie>>(UPCOMING_KEY).await {
        return Ok(Json(ApiResponse::ok("Upcoming movies", cached)));
    }

    let movies = movie_service::upcoming(&state.pool).await?;
    state.cache.set_json(UPCOMING_KEY, &movies).await;

    Ok(Json(ApiResponse::ok("Upcoming movies", movies)))
}

/// `GET /api/v1/movies/:id`
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<ApiResponse<MovieDetail>>, AppError> {
    let movie = movie_service::get_movie_detail(&state.pool, movie_id).await?;

    Ok(Json(ApiResponse::ok("Movie detail", movie)))
}

/// Add a movie.
///
/// # Response
///
/// - **Success (201 Created)**: the stored movie
/// - **Error (400)**: blank title, bad release date or duration, unknown
///   genre/director/actor id
/// - **Error (403)**: caller is not an admin
pub async fn create_movie(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Movie>>), AppError> {
    auth.require_admin()?;

    let movie = movie_service::create_movie(&state.pool, request).await?;
    state.cache.invalidate_prefix(MOVIES_PREFIX).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Movie created successfully", movie)),
    ))
}

/// Link a genre to a movie.
///
/// # Request Body
///
/// ```json
/// { "movie_id": 12, "genre_id": 3 }
/// ```
///
/// # Response
///
/// - **Error (404)**: unknown movie or genre
/// - **Error (409)**: already linked
pub async fn add_genre(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<AddGenreRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth.require_admin()?;

    movie_service::add_genre(&state.pool, request.movie_id, request.genre_id).await?;
    state.cache.invalidate_prefix(MOVIES_PREFIX).await;

    Ok(Json(ApiResponse::message("Genre added to movie")))
}

/// Delete a movie.
///
/// - **Error (404)**: unknown movie
/// - **Error (409)**: the movie has bookings
pub async fn delete_movie(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(movie_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth.require_admin()?;

    movie_service::delete_movie(&state.pool, movie_id).await?;
    state.cache.invalidate_prefix(MOVIES_PREFIX).await;

    Ok(Json(ApiResponse::message("Movie deleted successfully")))
}
