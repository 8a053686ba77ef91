/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /login` - Log in (creating the account on first use) and set the session cookie
/// - `POST /logout` - End the session and clear the cookie
///
/// # Auto-registration
///
/// When `AUTO_REGISTER` is on (the default), logging in with a username that
/// does not exist yet creates the account with the supplied password and
/// reports `"created": true`. With it off, unknown usernames are rejected
/// like a wrong password.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::{clear_session_cookie, session_cookie, session_token},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use todoboard_shared::{
    auth::password::{hash_password_blocking, verify_password_blocking},
    models::user::NewUser,
};
use tracing::{debug, info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(max = 64, message = "Username must be at most 64 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(max = 1024, message = "Password must be at most 1024 characters"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,

    /// Whether this login created the account
    pub created: bool,

    pub username: String,
}

/// Logout response
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// { "username": "alice", "password": "correct horse" }
/// ```
///
/// # Response
///
/// ```text
/// Set-Cookie: sid=...; Path=/; HttpOnly; SameSite=Lax; Max-Age=28800
///
/// { "ok": true, "created": false, "username": "alice" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing username or password, malformed body
/// - `401 Unauthorized`: Wrong password (or unknown user without auto-registration)
/// - `409 Conflict`: The same new username was registered concurrently
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    req.validate()?;

    let username = req.username.trim().to_string();
    if username.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Missing credentials".to_string()));
    }

    let (user, created) = match state.users.find_by_username(&username).await? {
        Some(user) => {
            let valid = verify_password_blocking(req.password, user.password_hash.clone()).await?;
            if !valid {
                warn!(username = %username, "Login failed: wrong password");
                return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            (user, false)
        }
        None if state.config.session.auto_register => {
            let password_hash = hash_password_blocking(req.password).await?;
            let user = state
                .users
                .create(NewUser {
                    username,
                    password_hash,
                })
                .await?;

            info!(user_id = %user.id, username = %user.username, "Registered user on first login");
            (user, true)
        }
        None => {
            warn!(username = %username, "Login failed: unknown user");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    let token = state.sessions.create(user.id, &user.username).await;
    let cookie = session_cookie(
        &token,
        state.sessions.ttl().num_seconds(),
        state.config.session.secure_cookie,
    )?;

    info!(user_id = %user.id, created, "User logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            ok: true,
            created,
            username: user.username,
        }),
    ))
}

/// Logout endpoint
///
/// Ends the current session if there is one and always clears the cookie,
/// so calling it twice is harmless.
///
/// ```text
/// POST /logout
/// ```
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = session_token(&headers) {
        let ended = state.sessions.destroy(&token).await;
        debug!(ended, "Logout");
    }

    let cookie = clear_session_cookie(state.config.session.secure_cookie)?;

    Ok(([(header::SET_COOKIE, cookie)], Json(LogoutResponse { ok: true })))
}
