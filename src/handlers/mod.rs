//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, query string, URL params)
//! 2. Parses it into typed values and calls a service
//! 3. Wraps the result in the [`crate::response::ApiResponse`] envelope

/// Registration, login, profile and user administration endpoints
pub mod auth;

/// Genre, actor and director endpoints
pub mod catalog;

/// Service health endpoint
pub mod health;

/// Movie catalog endpoints
pub mod movies;

pub mod payment_methods;

/// Seat availability and booking endpoints
pub mod transactions;
