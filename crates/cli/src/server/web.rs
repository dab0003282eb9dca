use axum::Router;
use dns_proxy_api::{create_api_routes, AppState};
use dns_proxy_application::services::{ServiceLifecycle, SubsystemFuture};
use dns_proxy_domain::{StartupFailure, Subsystem};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Binds the admin endpoint, then serves whatever router the route mapping
/// task hands over. Bind and serve errors are [`Subsystem::WebServer`]
/// failures.
pub fn web_server_task(bind_addr: SocketAddr, routes: oneshot::Receiver<Router>) -> SubsystemFuture {
    Box::pin(async move {
        let failure = |e: std::io::Error| {
            StartupFailure::new(
                Subsystem::WebServer,
                format!("Web server on {} failed: {}", bind_addr, e),
            )
        };

        let listener = tokio::net::TcpListener::bind(bind_addr)
            .await
            .map_err(failure)?;
        info!(
            bind_address = %bind_addr,
            api_url = format!("http://{}/api", bind_addr),
            "Web server listening"
        );

        let Ok(api) = routes.await else {
            // Route mapping failed; that task reports the failure.
            return Ok(());
        };

        let app = Router::new()
            .nest("/api", api)
            .layer(TraceLayer::new_for_http());

        axum::serve(listener, app).await.map_err(failure)
    })
}

/// Builds the admin routes, hands them to the web server, then points the
/// host resolver at the proxy.
pub fn route_mapping_task(
    state: AppState,
    routes: oneshot::Sender<Router>,
    lifecycle: Arc<ServiceLifecycle>,
) -> SubsystemFuture {
    Box::pin(async move {
        if routes.send(create_api_routes(state)).is_err() {
            // The web server already failed and reported it.
            return Ok(());
        }
        info!("Admin routes mapped");

        lifecycle.host_override_task().await
    })
}
