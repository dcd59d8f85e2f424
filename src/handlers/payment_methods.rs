//! Payment method HTTP handlers.
//!
//! - GET /api/v1/payment-methods (public)
//! - POST /api/v1/payment-methods (admin)
//! - DELETE /api/v1/payment-methods/:id (admin)

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::payment_method::{CreatePaymentMethodRequest, PaymentMethod},
    response::ApiResponse,
    services::payment_method_service,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

pub async fn list_payment_methods(
    State(pool): State<DbPool>,
) -> Result<Json<ApiResponse<Vec<PaymentMethod>>>, AppError> {
    let methods = payment_method_service::list_payment_methods(&pool).await?;

    Ok(Json(ApiResponse::ok("List payment methods", methods)))
}

/// Register a payment method.
///
/// # Request Body
///
/// ```json
/// { "payment_name": "Dana" }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**
/// - **Error (409)**: name already registered
pub async fn create_payment_method(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreatePaymentMethodRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentMethod>>), AppError> {
    auth.require_admin()?;

    let method =
        payment_method_service::create_payment_method(&pool, &request.payment_name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Payment method created successfully", method)),
    ))
}

pub async fn delete_payment_method(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth.require_admin()?;

    payment_method_service::delete_payment_method(&pool, id).await?;

    Ok(Json(ApiResponse::message("Payment method deleted successfully")))
}
