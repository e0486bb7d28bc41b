//! In-process HTTP client for integration testing.
//!
//! Drives the full router through `tower::ServiceExt::oneshot`, so requests
//! pass through the real middleware, extractors, and error envelopes without
//! binding a socket.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use server_core::domains::auth::JwtService;
use server_core::server::app::build_app;

/// HTTP client for exercising API endpoints in tests.
pub struct ApiClient {
    app: Router,
    bearer: Option<String>,
}

/// A completed response: status plus the parsed JSON body (Null when empty).
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// Gets a value at the given JSON path.
    ///
    /// # Example
    /// ```ignore
    /// let name = response.get("contact.name");
    /// ```
    pub fn get(&self, path: &str) -> Value {
        let mut current = &self.body;
        for key in path.split('.') {
            current = match key.parse::<usize>() {
                Ok(index) => &current[index],
                Err(_) => &current[key],
            };
        }
        current.clone()
    }
}

impl ApiClient {
    pub fn new(pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            app: build_app(pool, jwt_service),
            bearer: None,
        }
    }

    /// Returns a client that sends `Authorization: Bearer <token>` on every
    /// request.
    pub fn with_token(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    pub async fn get(&self, path: &str) -> ApiResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> ApiResponse {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> ApiResponse {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResponse {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = &self.bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body was not JSON")
        };

        ApiResponse { status, body }
    }
}
