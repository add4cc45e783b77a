use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Environments
        .route(
            "/games/{game}/environments",
            get(handlers::list_environments),
        )
        .route(
            "/games/{game}/environments/{env}/builds",
            post(handlers::prepare_build),
        )
        .route(
            "/games/{game}/environments/{env}/builds/{version}/deploy",
            post(handlers::finalize_deployment),
        )
        .route(
            "/games/{game}/environments/{env}/deployments",
            get(handlers::list_deployments),
        )
        .route(
            "/games/{game}/environments/{env}/deployments/current",
            get(handlers::current_deployment),
        )
        .route(
            "/games/{game}/environments/{env}/deployments/{version}",
            get(handlers::deployment_detail),
        )
        // Platforms
        .route(
            "/games/{game}/platforms/{platform}/releases",
            get(handlers::list_releases),
        )
        .route(
            "/games/{game}/platforms/{platform}/releases/current",
            get(handlers::current_release),
        )
        .route(
            "/games/{game}/platforms/{platform}/releases/{key}",
            get(handlers::release_detail),
        )
        .route(
            "/games/{game}/platforms/{platform}/publish",
            post(handlers::publish),
        )
        .route(
            "/games/{game}/platforms/{platform}/rollback",
            post(handlers::rollback),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
