use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::require_api_keys;
use crate::handlers::{self, AppState};
use crate::openapi::ApiDoc;

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Cross-origin policy for the dashboard: the request's origin is echoed back.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-secret-key"),
        ])
        .allow_credentials(true)
}

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    // Authenticated API routes
    let protected_routes = Router::new()
        .route("/enrich", post(handlers::scrape_metadata))
        .route("/api/scrape_metadata", post(handlers::scrape_metadata))
        .route("/api/generate_sop", post(handlers::generate_sop))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_keys));

    // Health check and docs bypass authentication
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/health-check", get(handlers::health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}
