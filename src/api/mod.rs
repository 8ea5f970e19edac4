//! HTTP API.

mod error;
mod routes;

pub use error::{ApiError, ApiResult, ErrorResponse};

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use okr_core::{HierarchyStore, TextGenerator};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HierarchyStore>,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(store: Arc<dyn HierarchyStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { store, generator }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/objectives",
            get(routes::list_objectives).post(routes::create_objective),
        )
        .route(
            "/api/objectives/{id}",
            get(routes::get_objective)
                .put(routes::replace_objective)
                .delete(routes::delete_objective),
        )
        .route(
            "/api/objectives/{id}/key-results",
            post(routes::create_key_result),
        )
        .route(
            "/api/key-results/{id}",
            put(routes::replace_key_result).delete(routes::delete_key_result),
        )
        .route(
            "/api/key-results/{id}/progress",
            put(routes::update_key_result_progress),
        )
        .route(
            "/api/key-results/{id}/initiatives",
            post(routes::create_initiative),
        )
        .route(
            "/api/initiatives/{id}",
            put(routes::replace_initiative).delete(routes::delete_initiative),
        )
        .route("/api/dashboard", get(routes::dashboard))
        .route("/api/ai/generate", post(routes::generate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
