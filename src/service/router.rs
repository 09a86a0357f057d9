use crate::service::{api, state::AppState};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer, services::ServeDir, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

/// Room for the text fields and multipart framing on top of the two uploads.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Builds the HTTP surface: the generate endpoint and the health routes, with
/// the static form UI as a fallback.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes() * 2 + FORM_OVERHEAD_BYTES;

    let api_routes = Router::new()
        .route("/api/generate", post(api::generate_memo))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/health", get(api::health_check))
        .route("/version", get(api::version))
        .merge(api_routes)
        .fallback_service(ServeDir::new(&state.config.public.dir))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
