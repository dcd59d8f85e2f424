//! Booking service - seat availability, booking creation and booking listings.
//!
//! This service handles:
//! - Finding which seats of a screening are already booked
//! - Creating a booking and its seat lines atomically
//! - Listing bookings for one user or for everyone
//!
//! # Mutual Exclusion
//!
//! Two bookings may never claim the same seat of the same screening. Two layers
//! enforce this, both inside the booking's own database transaction:
//!
//! 1. The occupied-seat query is re-run on the transaction's connection right
//!    before inserting, so a seat committed earlier is reported as a conflict.
//! 2. `booking_seats` carries a unique constraint over the screening identity and
//!    the seat label. When two transactions pass step 1 concurrently, the second
//!    seat insert waits on the first and then fails with a unique violation. That
//!    violation is the authoritative "seat taken" signal and becomes
//!    [`AppError::SeatsUnavailable`].
//!
//! Seat lines are inserted in label order, not request order, so two bookings
//! that overlap on several seats always contend for them in the same sequence
//! and one simply waits for the other. A deadlock or serialization failure that
//! still slips through is reported like a lost seat race.
//!
//! Any failure rolls the whole booking back; a header without its seats is never
//! visible to other connections.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        booking::{Booking, BookingCreated, BookingFilter, BookingSummary},
        show::{SeatSelection, ShowKey},
    },
    services::{movie_service, payment_method_service},
};

/// Name of the unique constraint guarding (screening, seat label).
pub const SEAT_UNIQUE_CONSTRAINT: &str = "booking_seats_show_seat_key";

/// SQLSTATE `deadlock_detected`
const DEADLOCK_DETECTED: &str = "40P01";

/// SQLSTATE `serialization_failure`
const SERIALIZATION_FAILURE: &str = "40001";

/// Find which seats of a screening are already booked.
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `show` - Screening identity
/// * `candidates` - Seats to check; an empty slice asks for every occupied seat
///
/// # Returns
///
/// The booked subset of `candidates` (or all booked seats), sorted by label.
/// An empty vector when nothing is booked.
///
/// # Errors
///
/// - `Database`: storage unavailable or query failed
pub async fn find_conflicts(
    pool: &DbPool,
    show: &ShowKey,
    candidates: &[String],
) -> Result<Vec<String>, AppError> {
    Ok(occupied_seats(pool, show, candidates).await?)
}

/// Occupied-seat query, runnable on the pool or inside a transaction.
async fn occupied_seats<'e, E>(
    executor: E,
    show: &ShowKey,
    candidates: &[String],
) -> Result<Vec<String>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT seat_label
        FROM booking_seats
        WHERE movie_id = $1
          AND show_date = $2
          AND show_time = $3
          AND location_key = $4
          AND cinema_key = $5
          AND (cardinality($6::text[]) = 0 OR seat_label = ANY($6::text[]))
        ORDER BY seat_label
        "#,
    )
    .bind(show.movie_id())
    .bind(show.show_date())
    .bind(show.show_time())
    .bind(show.location_key())
    .bind(show.cinema_key())
    .bind(candidates)
    .fetch_all(executor)
    .await
}

/// Book seats for a screening.
///
/// # Process
///
/// 1. Compute the total price (seat count × per-seat price)
/// 2. Check the movie and payment method exist
/// 3. Start database transaction
/// 4. Re-check seat availability on the transaction's connection
/// 5. Insert the booking header
/// 6. Insert one seat line per seat, in label order, each keeping its request position
/// 7. Commit (or rollback on any error)
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `user_id` - Authenticated user making the booking
/// * `show` - Validated screening identity
/// * `seats` - Validated, duplicate-free seat selection
/// * `price_per_seat` - Price of one seat in whole currency units
/// * `payment_method_id` - Payment option used
///
/// # Errors
///
/// - `InvalidRequest`: non-positive price or total overflow (no storage access)
/// - `MovieNotFound` / `PaymentMethodNotFound`: unknown reference (no transaction opened)
/// - `SeatsUnavailable`: some seats already belong to another booking
/// - `Internal`: header insert returned no row
/// - `Database`: any other storage failure; nothing was written
pub async fn create_booking(
    pool: &DbPool,
    user_id: Uuid,
    show: &ShowKey,
    seats: &SeatSelection,
    price_per_seat: i64,
    payment_method_id: i64,
) -> Result<BookingCreated, AppError> {
    let total_price = seats.total_price(price_per_seat)?;

    if !movie_service::movie_exists(pool, show.movie_id()).await? {
        return Err(AppError::MovieNotFound);
    }
    if !payment_method_service::payment_method_exists(pool, payment_method_id).await? {
        return Err(AppError::PaymentMethodNotFound);
    }

    let mut tx = pool.begin().await?;

    // Seats committed by other bookings before this point
    let conflicts = occupied_seats(&mut *tx, show, seats.labels()).await?;
    if !conflicts.is_empty() {
        tx.rollback().await?;
        tracing::warn!(
            movie_id = show.movie_id(),
            seats = ?conflicts,
            "booking rejected: seats already taken"
        );
        return Err(AppError::SeatsUnavailable(conflicts));
    }

    let booking = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (
            id,
            user_id,
            movie_id,
            show_date,
            show_time,
            location,
            cinema,
            total_price,
            payment_method_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, user_id, movie_id, show_date, show_time, location, cinema,
                  total_price, payment_method_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(show.movie_id())
    .bind(show.show_date())
    .bind(show.show_time())
    .bind(show.location())
    .bind(show.cinema())
    .bind(total_price)
    .bind(payment_method_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::Internal("booking insert returned no row".to_string()))?;

    // Lock order: by label, so overlapping bookings queue instead of deadlocking
    let mut lines: Vec<(usize, &String)> = seats.labels().iter().enumerate().collect();
    lines.sort_by(|a, b| a.1.cmp(b.1));

    for (position, label) in lines {
        let position = i32::try_from(position)
            .map_err(|_| AppError::InvalidRequest("Too many seats".to_string()))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO booking_seats (
                booking_id,
                position,
                seat_label,
                price_per_seat,
                movie_id,
                show_date,
                show_time,
                location_key,
                cinema_key
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(booking.id)
        .bind(position)
        .bind(label)
        .bind(price_per_seat)
        .bind(show.movie_id())
        .bind(show.show_date())
        .bind(show.show_time())
        .bind(show.location_key())
        .bind(show.cinema_key())
        .execute(&mut *tx)
        .await;

        if let Err(error) = inserted {
            tx.rollback().await?;
            return Err(seat_insert_error(pool, show, seats, label, error).await);
        }
    }

    // Commit header and seat lines atomically
    tx.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        user_id = %user_id,
        movie_id = show.movie_id(),
        seat_count = seats.len(),
        total_price,
        "booking created"
    );

    Ok(BookingCreated {
        id: booking.id,
        seats: seats.labels().to_vec(),
        total_price: booking.total_price,
        created_at: booking.created_at,
    })
}

/// Translate a failed seat insert after the transaction was rolled back.
///
/// A unique violation on [`SEAT_UNIQUE_CONSTRAINT`] means a concurrent booking
/// won the seat; the full conflict list is re-read from committed data. A
/// deadlock or serialization failure is treated the same way.
async fn seat_insert_error(
    pool: &DbPool,
    show: &ShowKey,
    seats: &SeatSelection,
    label: &str,
    error: sqlx::Error,
) -> AppError {
    if !is_seat_taken(&error) && !is_contention_abort(&error) {
        return AppError::Database(error);
    }

    match find_conflicts(pool, show, seats.labels()).await {
        Ok(conflicts) if !conflicts.is_empty() => {
            tracing::warn!(
                movie_id = show.movie_id(),
                seats = ?conflicts,
                "booking lost seat race"
            );
            AppError::SeatsUnavailable(conflicts)
        }
        Ok(_) => AppError::SeatsUnavailable(vec![label.to_string()]),
        Err(e) => e,
    }
}

/// Whether a storage error is the seat uniqueness constraint firing.
pub fn is_seat_taken(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(SEAT_UNIQUE_CONSTRAINT)
        }
        _ => false,
    }
}

/// Whether the transaction was aborted by PostgreSQL to resolve lock contention.
pub fn is_contention_abort(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some(DEADLOCK_DETECTED) | Some(SERIALIZATION_FAILURE)
        ),
        _ => false,
    }
}

/// List bookings, most recent first.
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `filter` - `All` for the admin view, `User(id)` for one user's bookings
///
/// # Returns
///
/// Summaries joined with movie title and payment method name, seats aggregated
/// in booking order. A booking without seat lines is kept with an empty list.
/// Unknown users and an empty store both yield an empty vector.
pub async fn list_bookings(
    pool: &DbPool,
    filter: BookingFilter,
) -> Result<Vec<BookingSummary>, AppError> {
    let bookings = sqlx::query_as::<_, BookingSummary>(
        r#"
        SELECT
            b.id AS booking_id,
            m.title AS movie_title,
            b.show_date,
            b.show_time,
            b.location,
            b.cinema,
            COALESCE(
                ARRAY_AGG(s.seat_label ORDER BY s.position)
                    FILTER (WHERE s.seat_label IS NOT NULL),
                '{}'
            ) AS seats,
            b.total_price,
            pm.payment_name AS payment_method_name,
            b.created_at
        FROM bookings b
        JOIN movies m ON m.id = b.movie_id
        JOIN payment_methods pm ON pm.id = b.payment_method_id
        LEFT JOIN booking_seats s ON s.booking_id = b.id
        WHERE ($1::uuid IS NULL OR b.user_id = $1)
        GROUP BY b.id, m.title, pm.payment_name
        ORDER BY b.created_at DESC, b.id DESC
        "#,
    )
    .bind(filter.user_id())
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}
