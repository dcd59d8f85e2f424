//! Genre, actor and director HTTP handlers.
//!
//! Each list has the same three endpoints:
//! - GET /api/v1/{genres,actors,directors} (public)
//! - POST /api/v1/{genres,actors,directors} (admin)
//! - DELETE /api/v1/{genres,actors,directors}/:id (admin)
//!
//! Deleting an entry unlinks it from movies, so cached movie listings are
//! dropped too.

use crate::{
    cache::MOVIES_PREFIX,
    error::AppError,
    middleware::auth::AuthContext,
    models::catalog::{CatalogEntry, CatalogKind, CreateCatalogEntryRequest},
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

type ListResponse = Result<Json<ApiResponse<Vec<CatalogEntry>>>, AppError>;
type CreatedResponse = Result<(StatusCode, Json<ApiResponse<CatalogEntry>>), AppError>;
type DeletedResponse = Result<Json<ApiResponse<()>>, AppError>;

async fn list(state: &AppState, kind: CatalogKind, message: &'static str) -> ListResponse {
    let entries = catalog_service::list_entries(&state.pool, kind).await?;

    Ok(Json(ApiResponse::ok(message, entries)))
}

async fn create(
    state: &AppState,
    auth: AuthContext,
    kind: CatalogKind,
    request: CreateCatalogEntryRequest,
) -> CreatedResponse {
    auth.require_admin()?;

    let entry = catalog_service::create_entry(&state.pool, kind, &request.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            format!("{} created successfully", kind.label()),
            entry,
        )),
    ))
}

async fn remove(state: &AppState, auth: AuthContext, kind: CatalogKind, id: i64) -> DeletedResponse {
    auth.require_admin()?;

    catalog_service::delete_entry(&state.pool, kind, id).await?;
    state.cache.invalidate_prefix(MOVIES_PREFIX).await;

    Ok(Json(ApiResponse::message(format!(
        "{} deleted successfully",
        kind.label()
    ))))
}

pub async fn list_genres(State(state): State<AppState>) -> ListResponse {
    list(&state, CatalogKind::Genre, "List genres").await
}

/// Add a genre.
///
/// # Request Body
///
/// ```json
/// { "name": "Action" }
/// ```
///
/// `genre_name` is accepted in place of `name`.
///
/// # Response
///
/// - **Success (201 Created)**
/// - **Error (403)**: caller is not an admin
/// - **Error (409)**: name already exists
pub async fn create_genre(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateCatalogEntryRequest>,
) -> CreatedResponse {
    create(&state, auth, CatalogKind::Genre, request).await
}

pub async fn delete_genre(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> DeletedResponse {
    remove(&state, auth, CatalogKind::Genre, id).await
}

pub async fn list_actors(State(state): State<AppState>) -> ListResponse {
    list(&state, CatalogKind::Actor, "List actors").await
}

pub async fn create_actor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateCatalogEntryRequest>,
) -> CreatedResponse {
    create(&state, auth, CatalogKind::Actor, request).await
}

pub async fn delete_actor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> DeletedResponse {
    remove(&state, auth, CatalogKind::Actor, id).await
}

pub async fn list_directors(State(state): State<AppState>) -> ListResponse {
    list(&state, CatalogKind::Director, "List directors").await
}

pub async fn create_director(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateCatalogEntryRequest>,
) -> CreatedResponse {
    create(&state, auth, CatalogKind::Director, request).await
}

pub async fn delete_director(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> DeletedResponse {
    remove(&state, auth, CatalogKind::Director, id).await
}
