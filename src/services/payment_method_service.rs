//! Payment method service.

use crate::{db::DbPool, error::AppError, models::payment_method::PaymentMethod};

/// All payment methods, ordered by name.
pub async fn list_payment_methods(pool: &DbPool) -> Result<Vec<PaymentMethod>, AppError> {
    let methods = sqlx::query_as::<_, PaymentMethod>(
        "SELECT id, payment_name FROM payment_methods ORDER BY payment_name, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(methods)
}

pub async fn payment_method_exists(pool: &DbPool, id: i64) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM payment_methods WHERE id = $1)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Register a payment method.
///
/// # Errors
///
/// - `InvalidRequest`: blank name
/// - `Conflict`: a method with this name already exists
pub async fn create_payment_method(
    pool: &DbPool,
    payment_name: &str,
) -> Result<PaymentMethod, AppError> {
    let payment_name = payment_name.trim();
    if payment_name.is_empty() {
        return Err(AppError::InvalidRequest(
            "payment_name is required".to_string(),
        ));
    }

    let method = sqlx::query_as::<_, PaymentMethod>(
        r#"
        INSERT INTO payment_methods (payment_name)
        VALUES ($1)
        RETURNING id, payment_name
        "#,
    )
    .bind(payment_name)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Payment method {payment_name} already exists"))
        }
        _ => AppError::Database(e),
    })?;

    tracing::info!(payment_method_id = method.id, "payment method created");
    Ok(method)
}

/// Delete a payment method no booking uses.
///
/// # Errors
///
/// - `PaymentMethodNotFound`: unknown id
/// - `Conflict`: referenced by a booking
pub async fn delete_payment_method(pool: &DbPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::Conflict("Payment method is used by bookings".to_string())
            }
            _ => AppError::Database(e),
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::PaymentMethodNotFound);
    }

    Ok(())
}
