use axum::{extract::State, Json};
use tracing::debug;

use crate::{dto::HealthResponse, state::AppState};

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let lifecycle = state.lifecycle.state();
    debug!(lifecycle = %lifecycle, "Health check requested");

    Json(HealthResponse {
        status: "ok",
        lifecycle: lifecycle.as_str(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
