use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig, error::ApiError, models::User, repository::RepositoryState,
};

/// How long an issued token stays valid.
const TOKEN_VALIDITY_HOURS: i64 = 1;

/// Claims
///
/// The payload signed into every bearer token. A token binds a request to
/// exactly one user identity for the duration of its validity window.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the id of the user this token authenticates.
    pub sub: Uuid,
    /// The username at issuance time, carried for convenience.
    pub username: String,
    /// Expiration timestamp. Tokens past this point are rejected.
    pub exp: usize,
    /// Issued-at timestamp.
    pub iat: usize,
}

/// create_token
///
/// Signs a new bearer token for `user`, valid for one hour.
pub fn create_token(user: &User, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(TOKEN_VALIDITY_HOURS))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: expiration as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// hash_password
///
/// Hashes a registration password with Argon2id and a fresh random salt,
/// producing a self-describing PHC string for storage.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// verify_password
///
/// Verifies a login password against a stored PHC hash. An unparseable
/// stored hash counts as a mismatch rather than an error, so login failures
/// stay indistinguishable to the caller.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers take this as
/// an argument to receive the caller's id for ownership checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any protected handler. The flow:
/// 1. Extract the `Authorization: Bearer <token>` header.
/// 2. Decode and validate the token (signature + expiration).
/// 3. Look the subject up in the credential store. A token whose user no
///    longer resolves is rejected even if cryptographically valid.
///
/// Rejection: 401 with a JSON error body on any failure. A missing
/// credential and a malformed one are both authorization failures here.
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

        let unauthorized = || ApiError::Unauthorized("token missing or invalid".to_string());

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        validation.validate_exp = true;

        // Expired, badly signed and malformed tokens all fail the same way.
        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| unauthorized())?;

        // The subject must still resolve to an existing user.
        let user = repo
            .get_user(token_data.claims.sub)
            .await?
            .ok_or_else(unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
        })
    }
}
