use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

/// Administrative routes, relative to the `/api` prefix the web server
/// nests them under.
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/containers", get(handlers::list_containers))
        .merge(handlers::hostnames::routes())
        .with_state(state)
}
