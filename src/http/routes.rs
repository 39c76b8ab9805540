//! HTTP routes: health check and the room socket endpoint.

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::room::RoomManager;
use crate::ws;

#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomManager,
    /// Bound of each connection's outbound queue.
    pub outbox_capacity: usize,
}

impl AppState {
    pub fn new() -> Self {
        Self { rooms: RoomManager::new(), outbox_capacity: config::outbox_capacity() }
    }
}

impl Default for AppState {
    fn default() -> Self { Self::new() }
}

pub async fn healthz() -> &'static str { "ok" }

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws::connection::ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // clients are served from anywhere
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
