//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/technologies", technology_routes())
        .nest("/tenant/{tenant_id}", tenant_routes())
}

/// Global technology catalogue
fn technology_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::technology::list_technologies).post(handlers::technology::create_technology),
        )
        .route(
            "/{id}",
            get(handlers::technology::get_technology)
                .patch(handlers::technology::update_technology)
                .delete(handlers::technology::delete_technology),
        )
}

/// Tenant-owned resources
fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses",
            get(handlers::course::list_courses).post(handlers::course::create_course),
        )
        .route(
            "/courses/{id}",
            get(handlers::course::get_course)
                .patch(handlers::course::update_course)
                .delete(handlers::course::delete_course),
        )
        .route(
            "/talents",
            get(handlers::talent::list_talents).post(handlers::talent::create_talent),
        )
        .route(
            "/talents/{id}",
            get(handlers::talent::get_talent)
                .patch(handlers::talent::update_talent)
                .delete(handlers::talent::delete_talent),
        )
        .route(
            "/batches",
            get(handlers::batch::list_batches).post(handlers::batch::create_batch),
        )
        .route(
            "/batches/{id}",
            get(handlers::batch::get_batch)
                .patch(handlers::batch::update_batch)
                .delete(handlers::batch::delete_batch),
        )
        .route(
            "/batches/{id}/talents",
            put(handlers::batch::enroll_talents).delete(handlers::batch::remove_talents),
        )
}
