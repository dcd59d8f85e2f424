//! Bearer token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the token from the Authorization header
//! 2. Verify its signature and expiry
//! 3. Inject a typed authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401
//!
//! Handlers never see raw claims. They receive an [`AuthContext`] whose role is
//! the [`Role`] enum, and admin-only handlers call [`AuthContext::require_admin`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::user::{Role, TokenResponse},
    state::AppState,
};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub role: Role,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Signing material and token lifetime, built once from configuration.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiration_seconds: i64,
}

impl TokenKeys {
    pub fn new(secret: &str, expiration_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiration_seconds,
        }
    }

    /// Sign an HS256 token for a user.
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<TokenResponse, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.expiration_seconds);

        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))?;

        Ok(TokenResponse { token, expires_at })
    }

    /// Verify signature and expiry and return the typed claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token validation failed");
                AppError::InvalidToken
            })
    }
}

/// Authentication context attached to authenticated requests.
///
/// Inserted into the request's extension map; handlers extract it with
/// `Extension<AuthContext>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    /// Authenticated user; bookings are created and listed for this id
    pub user_id: Uuid,

    pub role: Role,
}

impl AuthContext {
    /// Fail with `Forbidden` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::User => Err(AppError::Forbidden),
        }
    }
}

/// Token authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Verify the token with the configured secret
/// 3. If valid: inject `AuthContext` into request, call next handler
/// 4. Otherwise: return 401 Unauthorized error
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidToken)?;

    // Expected format: "Bearer <token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidToken)?;

    let claims = state.tokens.verify(token)?;

    let auth_context = AuthContext {
        user_id: claims.sub,
        role: claims.role,
    };

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_carries_user_and_role() {
        let keys = TokenKeys::new("test-secret", 3600);
        let user_id = Uuid::new_v4();

        let issued = keys.issue(user_id, Role::Admin).unwrap();
        let claims = keys.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well beyond the default 60s leeway
        let keys = TokenKeys::new("test-secret", -3600);
        let issued = keys.issue(Uuid::new_v4(), Role::User).unwrap();

        assert!(matches!(keys.verify(&issued.token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issued = TokenKeys::new("secret-a", 3600)
            .issue(Uuid::new_v4(), Role::User)
            .unwrap();

        let result = TokenKeys::new("secret-b", 3600).verify(&issued.token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn only_admins_pass_admin_check() {
        let user = AuthContext {
            user_id: Uuid::new_v4(),
            role: Role::User,
        };
        let admin = AuthContext {
            role: Role::Admin,
            ..user
        };

        assert!(matches!(user.require_admin(), Err(AppError::Forbidden)));
        assert!(admin.require_admin().is_ok());
    }
}
