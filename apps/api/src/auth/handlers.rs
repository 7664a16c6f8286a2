use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::session::{create_session_token, removal_cookie, session_cookie};
use crate::auth::validation::{
    validate_email, validate_name, validate_password, validate_phone,
};
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<StatusCode, AppError> {
    validate_name(&req.name).map_err(AppError::Validation)?;
    validate_email(&req.email).map_err(AppError::Validation)?;
    validate_phone(&req.phone).map_err(AppError::Validation)?;
    validate_password(&req.password).map_err(AppError::Validation)?;

    let existing: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Validation("email is already registered".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))?
        .to_string();

    let user_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, phone, password, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        "#,
    )
    .bind(user_id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&hashed)
    .bind(Utc::now())
    .execute(&state.db)
    .await?;

    info!("Created user {user_id}");
    Ok(StatusCode::CREATED)
}

/// POST /api/v1/auth/login
///
/// Unknown email and wrong password produce the same message so the
/// endpoint does not leak which accounts exist.
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    validate_email(&req.email).map_err(|_| invalid_credentials())?;
    validate_password(&req.password).map_err(|_| invalid_credentials())?;

    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(invalid_credentials)?;

    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|_| invalid_credentials())?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid_credentials())?;

    let token = create_session_token(&state.config.session_secret, &user)?;

    Ok((
        jar.add(session_cookie(token)),
        Json(SessionResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        }),
    ))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.remove(removal_cookie()), StatusCode::NO_CONTENT)
}

fn invalid_credentials() -> AppError {
    AppError::Validation("Invalid credentials".to_string())
}
