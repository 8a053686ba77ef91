/// Session cookie handling and the login gate
///
/// The gate runs in front of the to-do routes. It reads the `sid` cookie,
/// resolves it against the [`SessionStore`](todoboard_shared::auth::session::SessionStore)
/// and inserts an [`AuthContext`] into the request extensions. Handlers take
/// the owner from that context and never look at credentials themselves.
///
/// Without a live session the gate answers 401, unless login is optional
/// (`REQUIRE_LOGIN=false`), in which case the request proceeds as the
/// anonymous owner.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use todoboard_api::middleware::session::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("owner: {:?}", auth.owner())
/// }
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use todoboard_shared::auth::session::SESSION_COOKIE;
use uuid::Uuid;

use crate::{app::AppState, error::ApiError};

/// Identity resolved for the current request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// Logged-in user, `None` for anonymous requests
    pub user_id: Option<Uuid>,

    pub username: Option<String>,
}

impl AuthContext {
    pub fn user(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            username: Some(username.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Name for log lines
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("anonymous")
    }

    /// Owner under which to-do items are read and written
    pub fn owner(&self) -> Option<Uuid> {
        self.user_id
    }
}

/// Resolves the session cookie and enforces login when required
pub async fn session_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = match session_token(req.headers()) {
        Some(token) => state.sessions.resolve(&token).await,
        None => None,
    };

    let auth = match session {
        Some(session) => AuthContext::user(session.user_id, session.username),
        None if state.config.session.require_login => {
            return Err(ApiError::Unauthorized("Login required".to_string()));
        }
        None => AuthContext::anonymous(),
    };

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Extracts the session token from the request's `Cookie` headers
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that stores a session token
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid session cookie: {}", e)))
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, ApiError> {
    session_cookie("", 0, secure)
}
