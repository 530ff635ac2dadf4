use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{User, UserRole, UserStatus},
    repository::RepositoryState,
};

/// Claims
///
/// The payload expected inside a bearer JWT issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id, primary key of the `users` table.
    pub sub: Uuid,
    /// Expiration Time (exp): the token is rejected after this instant.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Role is read from the
/// `users` table on every request, never from the token, so demotions apply
/// immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Maps a stored profile to an identity. Only ACTIVE accounts may act.
fn active_identity(user: User) -> Result<AuthUser, AppError> {
    if user.status != UserStatus::Active {
        tracing::warn!(user_id = %user.id, status = ?user.status, "inactive account rejected");
        return Err(AppError::Forbidden("account is not active".to_string()));
    }
    Ok(AuthUser {
        id: user.id,
        role: user.role,
    })
}

/// AuthUser Extractor Implementation
///
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing
///    user is accepted as-is.
/// 2. Otherwise a `Bearer` JWT is decoded and its expiry validated.
/// 3. The subject is looked up in the repository for its current role/status.
///
/// Rejection: `AppError::Unauthorized` (401) for missing/invalid credentials or
/// unknown users, `AppError::Forbidden` (403) for non-active accounts.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local development bypass. Production always falls through to JWT validation.
        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| Uuid::parse_str(raw).ok());
            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.get_user(user_id).await? {
                    return active_identity(user);
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("expired token rejected"),
                other => tracing::debug!(reason = ?other, "invalid token rejected"),
            }
            AppError::Unauthorized
        })?;

        // A valid token for a user that no longer exists is still unauthenticated.
        let user = repo
            .get_user(token_data.claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        active_identity(user)
    }
}
