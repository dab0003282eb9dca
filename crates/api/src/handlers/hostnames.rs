use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use tracing::debug;

use crate::{
    dto::{HostnameRequest, HostnameResponse},
    errors::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hostnames", get(list_hostnames).post(create_hostname))
        .route("/hostnames/{id}", put(update_hostname).delete(delete_hostname))
}

async fn list_hostnames(State(state): State<AppState>) -> Json<Vec<HostnameResponse>> {
    let entries = state.hostnames.list.execute();
    debug!(count = entries.len(), "Hostnames listed");
    Json(entries.into_iter().map(HostnameResponse::from).collect())
}

async fn create_hostname(
    State(state): State<AppState>,
    Json(req): Json<HostnameRequest>,
) -> Result<(StatusCode, Json<HostnameResponse>), ApiError> {
    let created = state
        .hostnames
        .create
        .execute(&req.hostname, &req.record_type, &req.value, req.ttl)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn update_hostname(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<HostnameRequest>,
) -> Result<Json<HostnameResponse>, ApiError> {
    let updated = state
        .hostnames
        .update
        .execute(id, &req.hostname, &req.record_type, &req.value, req.ttl)
        .await?;

    Ok(Json(updated.into()))
}

async fn delete_hostname(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.hostnames.delete.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
