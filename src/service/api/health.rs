use crate::service::state::{AppState, BuildInfo};
use axum::{Json, extract::State};

/// Liveness check. Does not touch templates or the renderer.
pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn version(State(state): State<AppState>) -> Json<BuildInfo> {
    Json(state.build)
}
