//! Common test utilities for integration tests
//!
//! Builds the full router over in-memory stores and drives it with
//! `tower::ServiceExt::oneshot`, so no socket or database is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use todoboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use tower::ServiceExt;

/// Test context containing the app and its state
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
}

/// Response with the body decoded as JSON (`Null` when empty or not JSON)
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    /// The `Set-Cookie` header as a string
    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    /// The `Location` header as a string
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    /// The response body as a list of to-do items
    pub fn items(&self) -> Vec<Value> {
        self.body
            .as_array()
            .cloned()
            .unwrap_or_else(|| panic!("Expected a JSON array, got {}", self.body))
    }
}

impl TestContext {
    /// Creates a context with default configuration (login required)
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a context where requests without a session share one list
    pub fn single_user() -> Self {
        let mut config = Config::default();
        config.session.require_login = false;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::in_memory(config);
        let app = build_router(state.clone());
        Self { app, state }
    }

    /// Sends a request, optionally with a `Cookie` header and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        let text = String::from_utf8_lossy(&bytes).into_owned();

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, cookie, Some(body)).await
    }

    /// Logs in and returns the `sid=...` pair to send as a `Cookie` header
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post(
                "/login",
                None,
                serde_json::json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

        let set_cookie = response.set_cookie().expect("login sets a cookie");
        set_cookie
            .split(';')
            .next()
            .map(str::to_string)
            .expect("cookie has a name=value pair")
    }
}
