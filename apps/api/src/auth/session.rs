//! Signed, time-limited session tokens carried in an http-only cookie.
//!
//! Every data-access handler extracts [`Session`] first and fails closed
//! with `Unauthorized` when the cookie is absent, expired, or tampered with.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";
const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    id: Uuid,
    name: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// The verified identity of the requesting user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

/// Signs a session token for the given user (HS256, 7-day expiry).
pub fn create_session_token(secret: &str, user: &UserRow) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = SessionClaims {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign session token: {e}")))
}

/// Verifies a session token. Any failure (bad signature, expiry, malformed
/// payload) is treated as "no session" rather than an error.
pub fn verify_session_token(secret: &str, token: &str) -> Option<Session> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    Some(Session {
        user_id: data.claims.id,
        name: data.claims.name,
        email: data.claims.email,
    })
}

/// Builds the session cookie. The token itself carries the 7-day expiry.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Cookie shape handed to `CookieJar::remove` to clear the session.
/// Path must match the one the session cookie was set with.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(SESSION_COOKIE).ok_or(AppError::Unauthorized)?;
        verify_session_token(&state.config.session_secret, token.value())
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "5551234567".to_string(),
            password: "hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let user = sample_user();
        let token = create_session_token("secret", &user).unwrap();
        let session = verify_session_token("secret", &token).unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.name, user.name);
        assert_eq!(session.email, user.email);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_session_token("secret", &sample_user()).unwrap();
        assert!(verify_session_token("other-secret", &token).is_none());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = create_session_token("secret", &sample_user()).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_session_token("secret", &tampered).is_none());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_session_token("secret", "not-a-jwt").is_none());
    }
}
