//! Business logic layer.
//!
//! Services are free functions over a borrowed [`crate::db::DbPool`] and
//! return [`crate::error::AppError`]. Handlers parse input into typed values
//! before calling in; services never see raw request strings.

/// Seat availability, booking creation and listings
pub mod booking_service;

/// Genres, actors and directors
pub mod catalog_service;

/// Movie catalog
pub mod movie_service;

pub mod payment_method_service;

/// Registration, login, profiles and user administration
pub mod user_service;
