//! Registration, login, profile and user administration endpoints.
//!
//! - POST /api/v1/auth/register
//! - POST /api/v1/auth/login
//! - GET /api/v1/users/me (authenticated)
//! - PATCH /api/v1/users/me (authenticated)
//! - GET /api/v1/admin/users (admin)
//! - DELETE /api/v1/admin/users/:id (admin)

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::user::{
        LoginRequest, RegisterRequest, TokenResponse, UpdateProfileRequest, UserResponse,
    },
    response::ApiResponse,
    services::user_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Create an account.
///
/// # Request Body
///
/// ```json
/// {
///   "email": "budi@example.com",
///   "password": "secret123",
///   "full_name": "Budi Santoso"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the new user, without password hash
/// - **Error (400)**: invalid email or password shorter than 6 characters
/// - **Error (409)**: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = user_service::register(&state.pool, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Register success", user.into())),
    ))
}

/// Exchange credentials for an access token.
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Login success",
///   "results": { "token": "eyJ...", "expires_at": "2025-06-02T10:00:00Z" }
/// }
/// ```
///
/// - **Error (401)**: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let user = user_service::login(&state.pool, &request.email, &request.password).await?;
    let token = state.tokens.issue(user.id, user.role)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(ApiResponse::ok("Login success", token)))
}

/// Profile of the token's owner.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = user_service::get_user(&state.pool, auth.user_id).await?;

    Ok(Json(ApiResponse::ok("User profile", user.into())))
}

/// Update the caller's profile.
///
/// # Request Body
///
/// ```json
/// {
///   "full_name": "Budi Santoso",
///   "phone_number": "08123456789",
///   "old_password": "secret123",
///   "new_password": "secret456"
/// }
/// ```
///
/// Every field is optional; the two password fields go together.
///
/// # Response
///
/// - **Error (400)**: blank name, wrong old password, short new password
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = user_service::update_profile(&state.pool, auth.user_id, request).await?;

    Ok(Json(ApiResponse::ok("Profile updated", user.into())))
}

/// `GET /api/v1/admin/users`
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, AppError> {
    auth.require_admin()?;

    let users = user_service::list_users(&state.pool).await?;

    Ok(Json(ApiResponse::ok(
        "List users",
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// Delete a user account.
///
/// - **Error (404)**: unknown user
/// - **Error (409)**: the user has bookings
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth.require_admin()?;

    user_service::delete_user(&state.pool, user_id).await?;

    Ok(Json(ApiResponse::message("User deleted successfully")))
}
