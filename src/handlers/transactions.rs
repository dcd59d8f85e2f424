//! Seat availability and booking HTTP handlers.
//!
//! This module implements the booking API endpoints:
//! - GET /api/v1/check-seats - Which seats of a screening are taken (public)
//! - POST /api/v1/transactions - Book seats for the authenticated user
//! - GET /api/v1/transactions - The authenticated user's bookings
//! - GET /api/v1/admin/transactions - Every booking (admin only)
//!
//! All raw input is parsed into [`ShowKey`] and [`SeatSelection`] before the
//! database is touched, so malformed requests never open a transaction.

use crate::{
    cache::MOVIES_PREFIX,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        booking::{BookingCreated, BookingFilter, BookingSummary, CreateBookingRequest, SeatCheckQuery},
        show::{SeatSelection, ShowKey, parse_seat_filter},
    },
    response::ApiResponse,
    services::booking_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};

/// Check seat availability for a screening.
///
/// # Endpoint
///
/// `GET /api/v1/check-seats?movie_id=12&show_date=2025-06-01&show_time=19:30&location=Jakarta&cinema=CGV&seats=A1,A2`
///
/// `seats` is optional. With it, the response lists which of those seats are
/// taken; without it, every taken seat of the screening (for the seat map).
///
/// # Response
///
/// - **Success (200 OK)**: taken seat labels, sorted; empty when all are free
/// - **Error (400)**: malformed date, time or seat label
///
/// ```json
/// {
///   "success": true,
///   "message": "Seat availability checked",
///   "results": ["A2"]
/// }
/// ```
pub async fn check_seats(
    State(state): State<AppState>,
    Query(query): Query<SeatCheckQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let show = ShowKey::parse(
        query.movie_id,
        &query.show_date,
        &query.show_time,
        &query.location,
        &query.cinema,
    )?;
    let candidates = parse_seat_filter(query.seats.as_deref())?;

    let taken = booking_service::find_conflicts(&state.pool, &show, &candidates).await?;

    Ok(Json(ApiResponse::ok("Seat availability checked", taken)))
}

/// Book seats for the authenticated user.
///
/// # Endpoint
///
/// `POST /api/v1/transactions`
///
/// # Request Body
///
/// See [`CreateBookingRequest`]. `payment_method` is accepted as an alias of
/// `payment_method_id`.
///
/// # Response
///
/// - **Success (201 Created)**: booking id, seats and total price
/// - **Error (400)**: invalid show identity, seats or price
/// - **Error (401)**: missing or invalid token
/// - **Error (404)**: unknown movie or payment method
/// - **Error (409)**: seats already taken; `results` lists them
///
/// # Process
///
/// 1. Parse show identity and seat selection (no storage access on failure)
/// 2. Run the booking transaction, which prices the seats and checks the movie
///    and payment method before opening it
/// 3. Drop cached movie listings
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingCreated>>), AppError> {
    let show = ShowKey::parse(
        request.movie_id,
        &request.show_date,
        &request.show_time,
        &request.location,
        &request.cinema,
    )?;
    let seats = SeatSelection::parse(request.seats)?;

    let booking = booking_service::create_booking(
        &state.pool,
        auth.user_id,
        &show,
        &seats,
        request.price_per_seat,
        request.payment_method_id,
    )
    .await?;

    state.cache.invalidate_prefix(MOVIES_PREFIX).await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Transaction created successfully", booking)),
    ))
}

/// List the authenticated user's bookings, newest first.
///
/// `GET /api/v1/transactions`
pub async fn list_my_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<BookingSummary>>>, AppError> {
    let bookings =
        booking_service::list_bookings(&state.pool, BookingFilter::User(auth.user_id)).await?;

    Ok(Json(ApiResponse::ok("Transaction history", bookings)))
}

/// List every booking in the system, newest first.
///
/// `GET /api/v1/admin/transactions`
///
/// # Response
///
/// - **Error (403)**: caller is not an admin
pub async fn list_all_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<BookingSummary>>>, AppError> {
    auth.require_admin()?;

    let bookings = booking_service::list_bookings(&state.pool, BookingFilter::All).await?;

    Ok(Json(ApiResponse::ok("All transactions", bookings)))
}
