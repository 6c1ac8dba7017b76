use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    config::AppConfig,
    error::ApiError,
    models::{Role, User},
    repository::RepositoryState,
};

/// Claims
///
/// Payload of an issued bearer token. The full identity travels in the
/// token so the frontend can render the session without a round trip;
/// authorization decisions still re-resolve the user on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the provider-issued id (`users.google_id`).
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub profile_pic: Option<String>,
    /// Expiration instant (seconds since epoch). A token checked exactly at
    /// this instant is already expired.
    pub exp: usize,
    /// Issued-at instant (seconds since epoch).
    pub iat: usize,
}

/// TokenIssuer
///
/// Mints and validates the signed, stateless credentials used in place of
/// server-side sessions. There is no revocation: validity is signature plus
/// expiry, nothing else.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl_seconds: u64,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    /// Convenience constructor pulling secret and TTL from the loaded config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.jwt_secret.clone(), config.jwt_ttl_seconds)
    }

    /// issue
    ///
    /// Produces a signed token for a fully resolved user record, expiring
    /// `ttl_seconds` from now.
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ApiError::Internal(format!("clock error: {e}")))?
            .as_secs();

        let claims = Claims {
            sub: user.google_id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            profile_pic: user.profile_pic.clone(),
            iat: now as usize,
            exp: (now + self.ttl_seconds) as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("token issuance failed: {e}")))
    }

    /// verify
    ///
    /// Validates signature and expiry and returns the embedded claims.
    /// Expiry and signature failures are distinct error kinds so callers can
    /// prompt re-login versus reject outright.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // Zero leeway: a token presented at its exact expiry instant fails.
        validation.leeway = 0;

        let claims = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data.claims,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::ExpiredSignature => Err(ApiError::TokenExpired),
                    _ => Err(ApiError::TokenInvalid),
                };
            }
        };

        // The expiry instant itself is outside the validity window.
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as usize)
            .unwrap_or(usize::MAX);
        if claims.exp <= now {
            return Err(ApiError::TokenExpired);
        }

        Ok(claims)
    }
}

/// Extracts the bearer token string from the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated)
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Usable as a handler
/// argument on any route; extraction fails with 401 before the handler runs
/// if no valid credential is presented or the subject no longer resolves to
/// a user record.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = bearer_token(parts)?;
        let claims = TokenIssuer::from_config(&config).verify(token)?;

        // The token may outlive the account. Resolve the subject on every
        // request; this is a pure read, role changes happen only at login.
        let user = repo
            .find_user_by_subject(&claims.sub)
            .await?
            .ok_or(ApiError::UnknownUser)?;

        Ok(AuthUser { user })
    }
}

/// AdminUser
///
/// Authentication plus the administrator role requirement. Non-admin
/// credentials are rejected with 403 after passing authentication.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user: User,
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser { user } = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser { user })
    }
}
