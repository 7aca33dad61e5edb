use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/booking",
            post(handlers::booking::sync_booking)
                .options(handlers::booking::preflight)
                .fallback(handlers::booking::method_not_allowed),
        )
        .route("/api/test", get(handlers::diagnostics::diagnostics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
