//! HTTP API for address lookups
//!
//! This module exposes the lookup entry point and dataset status over REST.

mod handlers;
pub mod models;
mod routes;

use actix_web::{web, HttpResponse};
use utoipa::OpenApi;

/// Initialize API routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(routes::config_check_routes)
            .configure(routes::config_status_routes),
    )
    .route("/api-docs/openapi.json", web::get().to(openapi_json));
}

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Re-export ApiDoc for OpenAPI documentation
pub use routes::ApiDoc;
