use crate::history::handler;
use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tps_history_store::HistoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HistoryStore>,
}

pub fn create_router(store: Arc<dyn HistoryStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/tps/history", get(handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn healthz() -> &'static str {
    "ok"
}
