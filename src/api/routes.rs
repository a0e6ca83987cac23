//! API route definitions
//!
//! This module defines all API routes and their configurations.

use actix_web::web;
use utoipa::OpenApi;

use crate::api::handlers;
use crate::api::models;

/// Configure lookup routes
pub fn config_check_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/check")
            .route("", web::post().to(handlers::check_batch))
            .route("/{ip}", web::get().to(handlers::check_address)),
    );
}

/// Configure status routes
pub fn config_status_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/status", web::get().to(handlers::get_status))
        .route("/health", web::get().to(handlers::health));
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::check_address,
        handlers::check_batch,
        handlers::get_status,
        handlers::health,
    ),
    components(
        schemas(
            crate::model::LookupResult,
            crate::model::LocationRecord,
            crate::model::GeoFeedEntry,
            crate::service::DatasetStatus,
            crate::service::LoadState,
            crate::metrics::MetricsSnapshot,
            models::ErrorResponse,
            models::BatchCheckRequest,
            models::BatchCheckItem,
            models::StatusResponse,
        )
    ),
    tags(
        (name = "Lookup", description = "Address lookup endpoints"),
        (name = "Status", description = "Dataset status endpoints"),
    )
)]
pub struct ApiDoc;
