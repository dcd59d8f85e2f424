//! Payment method models.

use serde::{Deserialize, Serialize};

/// A payment option a booking can reference (e.g. "Dana", "BCA").
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub payment_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentMethodRequest {
    pub payment_name: String,
}
