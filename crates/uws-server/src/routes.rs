//! Router assembly for the UWS API.

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the application router with all routes.
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Health check routes
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health));

    // Job list routes; the trailing-slash spelling is accepted too
    let job_list_routes = Router::new()
        .route(
            "/uws",
            get(handlers::jobs::get_job_list).post(handlers::jobs::create_job),
        )
        .route(
            "/uws/",
            get(handlers::jobs::get_job_list).post(handlers::jobs::create_job),
        );

    // Per-job routes
    let job_routes = Router::new()
        .route(
            "/uws/{job_id}",
            get(handlers::jobs::get_job_summary)
                .post(handlers::jobs::update_job)
                .delete(handlers::jobs::delete_job),
        )
        .route(
            "/uws/{job_id}/phase",
            get(handlers::jobs::get_phase).post(handlers::jobs::update_phase),
        )
        .route(
            "/uws/{job_id}/destruction",
            get(handlers::jobs::get_destruction).post(handlers::jobs::update_destruction),
        )
        .route(
            "/uws/{job_id}/executionduration",
            get(handlers::jobs::get_execution_duration)
                .post(handlers::jobs::update_execution_duration),
        )
        .route("/uws/{job_id}/error", get(handlers::jobs::get_error_summary))
        .route("/uws/{job_id}/quote", get(handlers::jobs::get_quote))
        .route("/uws/{job_id}/owner", get(handlers::jobs::get_owner))
        .route(
            "/uws/{job_id}/parameters",
            get(handlers::jobs::get_parameters).post(handlers::jobs::update_parameters),
        )
        .route("/uws/{job_id}/results", get(handlers::jobs::get_results));

    Router::new()
        .merge(health_routes)
        .merge(job_list_routes)
        .merge(job_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
