//! User registration, login, profiles and account administration.
//!
//! Passwords are stored as argon2 PHC strings. Login failures never reveal
//! whether the email or the password was wrong.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::user::{RegisterRequest, Role, UpdateProfileRequest, User},
};

const MIN_PASSWORD_LEN: usize = 6;

fn check_password_len(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Display name derived from an email: `"jane.doe@x.io"` becomes `"Jane.doe"`.
fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Create a user account with the `user` role.
///
/// # Process
///
/// 1. Normalize the email (trimmed, lowercase) and validate both fields
/// 2. Hash the password
/// 3. Insert; a unique violation on email becomes `EmailTaken`
///
/// # Errors
///
/// - `InvalidRequest`: malformed email or short password
/// - `EmailTaken`: email already registered
/// - `Database`: storage failure
pub async fn register(pool: &DbPool, request: RegisterRequest) -> Result<User, AppError> {
    let email = request.email.trim().to_lowercase();
    if !email.contains('@') || email.starts_with('@') {
        return Err(AppError::InvalidRequest("Invalid email".to_string()));
    }
    check_password_len(&request.password)?;

    let full_name = request
        .full_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| name_from_email(&email));

    let password_hash = hash_password(&request.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, password_hash, full_name, phone_number, role, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(password_hash)
    .bind(full_name)
    .bind(Role::User.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::EmailTaken,
        _ => AppError::Database(e),
    })?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Check credentials and return the user.
///
/// # Errors
///
/// - `InvalidCredentials`: unknown email or wrong password
pub async fn login(pool: &DbPool, email: &str, password: &str) -> Result<User, AppError> {
    let user = find_by_email(pool, email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        tracing::debug!(user_id = %user.id, "password mismatch");
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password_hash, full_name, phone_number, role, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email.trim().to_lowercase())
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// # Errors
///
/// - `UserNotFound`: no user with this id (e.g. deleted after the token was issued)
pub async fn get_user(pool: &DbPool, user_id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password_hash, full_name, phone_number, role, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::UserNotFound)
}

/// Update name, phone number and/or password of a user.
///
/// # Process
///
/// 1. Load the user
/// 2. Validate the new values; a password change must present the current one
/// 3. Write only the supplied fields
///
/// # Errors
///
/// - `UserNotFound`: no user with this id
/// - `InvalidRequest`: blank name, incomplete password pair, wrong old password
///   or short new password
pub async fn update_profile(
    pool: &DbPool,
    user_id: Uuid,
    request: UpdateProfileRequest,
) -> Result<User, AppError> {
    let user = get_user(pool, user_id).await?;

    let full_name = match request.full_name.as_deref().map(str::trim) {
        Some("") => {
            return Err(AppError::InvalidRequest(
                "full_name must not be blank".to_string(),
            ));
        }
        name => name.map(str::to_string),
    };
    let phone_number = request.phone_number.map(|phone| phone.trim().to_string());

    let password_hash = match (request.old_password, request.new_password) {
        (None, None) => None,
        (Some(old), Some(new)) => {
            if !verify_password(&old, &user.password_hash) {
                return Err(AppError::InvalidRequest(
                    "Old password is incorrect".to_string(),
                ));
            }
            check_password_len(&new)?;
            Some(hash_password(&new)?)
        }
        _ => {
            return Err(AppError::InvalidRequest(
                "old_password and new_password must be sent together".to_string(),
            ));
        }
    };

    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET full_name = COALESCE($2, full_name),
            phone_number = COALESCE($3, phone_number),
            password_hash = COALESCE($4, password_hash),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, email, password_hash, full_name, phone_number, role, created_at
        "#,
    )
    .bind(user_id)
    .bind(full_name)
    .bind(phone_number)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    tracing::info!(user_id = %user_id, "profile updated");
    Ok(updated)
}

/// Every user, newest first.
pub async fn list_users(pool: &DbPool) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password_hash, full_name, phone_number, role, created_at
        FROM users
        ORDER BY created_at DESC, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Delete a user account that has no bookings.
///
/// # Errors
///
/// - `UserNotFound`: unknown id
/// - `Conflict`: the user has bookings
pub async fn delete_user(pool: &DbPool, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::Conflict("User has bookings and cannot be deleted".to_string())
            }
            _ => AppError::Database(e),
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::UserNotFound);
    }

    tracing::info!(user_id = %user_id, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_its_password() {
        let hash = hash_password("secret123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
        assert!(!verify_password("secret123", "not-a-hash"));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            check_password_len("12345"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(check_password_len("123456").is_ok());
    }

    #[test]
    fn full_name_defaults_to_capitalized_local_part() {
        assert_eq!(name_from_email("budi@example.com"), "Budi");
        assert_eq!(name_from_email("jane.doe@x.io"), "Jane.doe");
        assert_eq!(name_from_email("@x.io"), "");
    }
}
