/// Authentication endpoints
///
/// This module provides the login endpoint:
/// - `POST /api/login` - Authenticate and get a token
///
/// Credentials stored before the Argon2 migration are kept as plain text
/// in the database. Login still accepts them by direct comparison and
/// upgrades the row to an Argon2 hash on the spot, so the stored plain
/// text disappears the first time the user signs in.

use crate::{
    app::{AppState, ACCESS_TOKEN_COOKIE},
    config::AuthConfig,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    Json,
};
use planboard_shared::{
    auth::{jwt, password},
    models::user::User,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Signed JWT
    pub token: String,

    /// Always "Bearer"
    pub token_type: String,

    /// Token lifetime in seconds
    pub expires_in: i64,

    /// Authenticated user ID
    pub user_id: i64,

    /// Authenticated user email
    pub email: String,
}

/// Login endpoint
///
/// Authenticates a user and returns a JWT. When cookie mode is enabled
/// the token is also set as an `access_token` cookie so browser clients
/// do not have to manage the Authorization header themselves.
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<LoginResponse>)> {
    // Validate request
    req.validate().map_err(|e| validation_error(&e))?;

    // Find user by email. Unknown email and bad password produce the
    // same message so the endpoint does not leak which emails exist.
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if password::is_password_hash(&user.password) {
        let valid = password::verify_password(&req.password, &user.password)?;
        if !valid {
            return Err(ApiError::InvalidCredentials);
        }
    } else {
        // Legacy plain-text credential: compare directly, then upgrade
        // the stored value so the next login goes through Argon2.
        if user.password != req.password {
            return Err(ApiError::InvalidCredentials);
        }

        let upgraded = password::hash_password(&req.password)?;
        User::update_password(&state.db, user.id, &upgraded).await?;
        tracing::info!(user_id = user.id, "upgraded legacy credential to argon2");
    }

    // Generate token
    let ttl = chrono::Duration::seconds(state.config.auth.token_ttl_seconds);
    let claims = jwt::Claims::new(user.id, user.email.clone(), ttl);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    let mut headers = HeaderMap::new();
    if state.config.auth.token_in_cookie {
        let cookie = build_access_cookie(&state.config.auth, &token);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.insert(header::SET_COOKIE, value);
        }
    }

    Ok((
        headers,
        Json(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: state.config.auth.token_ttl_seconds,
            user_id: user.id,
            email: user.email,
        }),
    ))
}

/// Builds the Set-Cookie value for the access token
///
/// Always HttpOnly; Secure, SameSite and Domain follow configuration.
fn build_access_cookie(auth: &AuthConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
        ACCESS_TOKEN_COOKIE,
        token,
        auth.token_ttl_seconds,
        auth.cookie_same_site.as_str()
    );

    if auth.cookie_secure {
        cookie.push_str("; Secure");
    }

    if let Some(domain) = &auth.cookie_domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }

    cookie
}
