use axum::{extract::State, Json};
use tracing::debug;

use crate::{dto::ContainerResponse, state::AppState};

pub async fn list_containers(State(state): State<AppState>) -> Json<Vec<ContainerResponse>> {
    let mut containers = state.containers.list();
    containers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    debug!(count = containers.len(), "Containers listed");

    Json(containers.into_iter().map(ContainerResponse::from).collect())
}
