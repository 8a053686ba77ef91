/// Browser entry pages
///
/// Registered only when `STATIC_DIR` is set.
///
/// - `GET /` - Login page, or a redirect to `/app` for a live session
/// - `GET /app` - The to-do client, or a redirect to `/` without a session
///
/// With `REQUIRE_LOGIN=false` both paths serve the to-do client directly.

use crate::{app::AppState, middleware::session::session_token};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

const LOGIN_PAGE: &str = "login.html";
const APP_PAGE: &str = "index.html";

/// `GET /`
pub async fn index(State(state): State<AppState>, req: Request) -> Response {
    if !state.config.session.require_login {
        return serve_page(&state, APP_PAGE, req).await;
    }

    if has_session(&state, req.headers()).await {
        return Redirect::to("/app").into_response();
    }

    serve_page(&state, LOGIN_PAGE, req).await
}

/// `GET /app`
pub async fn app_page(State(state): State<AppState>, req: Request) -> Response {
    if state.config.session.require_login && !has_session(&state, req.headers()).await {
        return Redirect::to("/").into_response();
    }

    serve_page(&state, APP_PAGE, req).await
}

async fn has_session(state: &AppState, headers: &HeaderMap) -> bool {
    match session_token(headers) {
        Some(token) => state.sessions.resolve(&token).await.is_some(),
        None => false,
    }
}

async fn serve_page(state: &AppState, page: &str, req: Request) -> Response {
    let Some(dir) = &state.config.api.static_dir else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match ServeFile::new(dir.join(page)).oneshot(req).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
