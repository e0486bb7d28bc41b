//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::JwtService;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    create_contact_handler, delete_contact_handler, health_handler, list_contacts_handler,
    login_handler, refresh_handler, register_handler, search_contacts_handler,
    update_contact_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: Arc<JwtService>,
}

/// Build the Axum application router.
///
/// The auth middleware only attaches a verified `AuthUser` to the request;
/// each contact handler demands one through the extractor, so the /auth and
/// /health routes stay public.
pub fn build_app(pool: PgPool, jwt_service: JwtService) -> Router {
    let state = AppState {
        db_pool: pool,
        jwt_service: Arc::new(jwt_service),
    };
    let jwt = state.jwt_service.clone();

    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route(
            "/contacts",
            get(list_contacts_handler).post(create_contact_handler),
        )
        .route("/contacts/search", get(search_contacts_handler))
        .route(
            "/contacts/:contact_id",
            put(update_contact_handler).delete(delete_contact_handler),
        )
        .layer(middleware::from_fn(move |request, next| {
            jwt_auth_middleware(jwt.clone(), request, next)
        }))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
