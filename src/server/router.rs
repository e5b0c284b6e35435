use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers;
use crate::state::AppState;

/// Builds the application router.
///
/// CORS is fully permissive: the caller is a browser-hosted client served
/// from arbitrary origins.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/", post(handlers::answer))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}
