//! Booking data models and API request/response types.
//!
//! This module defines:
//! - `Booking`: database entity for a booking header
//! - `CreateBookingRequest` / `SeatCheckQuery`: raw request input
//! - `BookingCreated` / `BookingSummary`: response bodies
//! - `BookingFilter`: scope of a booking listing

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a booking header from the database.
///
/// # Database Table
///
/// Maps to the `bookings` table. Each booking:
/// - Belongs to one user
/// - Identifies one screening (movie, date, time, location, cinema)
/// - Owns one `booking_seats` row per reserved seat
///
/// Bookings are immutable once committed.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Booking {
    pub id: Uuid,

    pub user_id: Uuid,

    pub movie_id: i64,

    pub show_date: NaiveDate,

    pub show_time: NaiveTime,

    /// Location as entered by the first booker (display form)
    pub location: String,

    pub cinema: String,

    /// Seat count times per-seat price, in whole currency units
    pub total_price: i64,

    pub payment_method_id: i64,

    pub created_at: DateTime<Utc>,
}

/// Request body for booking seats.
///
/// # JSON Example
///
/// ```json
/// {
///   "movie_id": 12,
///   "show_date": "2025-06-01",
///   "show_time": "19:30",
///   "location": "Jakarta",
///   "cinema": "CGV Grand Indonesia",
///   "seats": ["A1", "A2"],
///   "price_per_seat": 50000,
///   "payment_method": 1
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub movie_id: i64,

    /// `YYYY-MM-DD`
    pub show_date: String,

    /// `HH:MM` or `HH:MM:SS`
    pub show_time: String,

    pub location: String,

    pub cinema: String,

    pub seats: Vec<String>,

    pub price_per_seat: i64,

    #[serde(alias = "payment_method")]
    pub payment_method_id: i64,
}

/// Query string of the seat availability check.
///
/// `seats` is an optional comma-separated list; when absent every occupied
/// seat of the screening is returned.
#[derive(Debug, Deserialize)]
pub struct SeatCheckQuery {
    pub movie_id: i64,
    pub show_date: String,
    pub show_time: String,
    pub location: String,
    pub cinema: String,
    #[serde(default)]
    pub seats: Option<String>,
}

/// Response returned after a successful booking.
#[derive(Debug, Clone, Serialize)]
pub struct BookingCreated {
    pub id: Uuid,
    pub seats: Vec<String>,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// One row of a booking listing.
///
/// # JSON Example
///
/// ```json
/// {
///   "booking_id": "3f0c...",
///   "movie_title": "Spider-Man: No Way Home",
///   "show_date": "2025-06-01",
///   "show_time": "19:30:00",
///   "location": "Jakarta",
///   "cinema": "CGV Grand Indonesia",
///   "seats": ["A1", "A2"],
///   "total_price": 100000,
///   "payment_method_name": "Dana",
///   "created_at": "2025-05-30T10:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct BookingSummary {
    pub booking_id: Uuid,
    pub movie_title: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub location: String,
    pub cinema: String,
    /// Seat labels in the order they were booked; empty for a booking without seat lines
    pub seats: Vec<String>,
    pub total_price: i64,
    pub payment_method_name: String,
    pub created_at: DateTime<Utc>,
}

/// Which bookings a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFilter {
    /// Every booking in the system (admin view)
    All,
    /// Bookings owned by one user
    User(Uuid),
}

impl BookingFilter {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            BookingFilter::All => None,
            BookingFilter::User(id) => Some(*id),
        }
    }
}
