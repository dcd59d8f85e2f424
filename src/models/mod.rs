//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request/response types built on them.

/// Booking header, listing and request types
pub mod booking;
/// Genres, actors and directors
pub mod catalog;
/// Movie catalog
pub mod movie;
/// Payment options referenced by bookings
pub mod payment_method;
/// Screening identity and seat selection
pub mod show;
/// Users, roles and auth payloads
pub mod user;
