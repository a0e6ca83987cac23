//! API request handlers
//!
//! This module contains the request handlers for all API endpoints.

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::debug;

use crate::api::models::*;
use crate::service::CloudIpChecker;

/// Check whether an address belongs to the provider
#[utoipa::path(
    get,
    path = "/api/v1/check/{ip}",
    params(
        ("ip" = String, Path, description = "IPv4 address in dotted-quad form")
    ),
    responses(
        (status = 200, description = "Lookup result (no match while datasets are loading)", body = crate::model::LookupResult),
        (status = 400, description = "Malformed address", body = ErrorResponse)
    ),
    tag = "Lookup"
)]
pub async fn check_address(checker: web::Data<CloudIpChecker>, ip: web::Path<String>) -> impl Responder {
    match checker.check_address(&ip) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            debug!("Rejected lookup for {:?}: {}", ip.as_str(), e);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
                code: Some("INVALID_ADDRESS".to_string()),
            })
        }
    }
}

/// Check several addresses at once
#[utoipa::path(
    post,
    path = "/api/v1/check",
    request_body = BatchCheckRequest,
    responses(
        (status = 200, description = "One item per submitted address, in order", body = Vec<BatchCheckItem>),
        (status = 400, description = "Empty or oversized batch", body = ErrorResponse)
    ),
    tag = "Lookup"
)]
pub async fn check_batch(
    checker: web::Data<CloudIpChecker>,
    request: web::Json<BatchCheckRequest>,
) -> impl Responder {
    if let Err(err) = request.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: err,
            code: Some("INVALID_BATCH".to_string()),
        });
    }

    let items: Vec<BatchCheckItem> = request
        .addresses
        .iter()
        .map(|address| match checker.check_address(address) {
            Ok(result) => BatchCheckItem {
                address: address.clone(),
                result: Some(result),
                error: None,
            },
            Err(e) => BatchCheckItem {
                address: address.clone(),
                result: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    HttpResponse::Ok().json(items)
}

/// Dataset load state and lookup counters
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "Current status", body = StatusResponse)
    ),
    tag = "Status"
)]
pub async fn get_status(checker: web::Data<CloudIpChecker>) -> impl Responder {
    let ready = checker.is_ready();
    if !ready {
        debug!("Status requested before datasets are available");
    }

    HttpResponse::Ok().json(StatusResponse {
        ready,
        strategy: checker.strategy().to_string(),
        prefixes: checker.prefixes_status(),
        geo_feed: checker.geo_feed_status(),
        metrics: checker.metrics().snapshot(),
    })
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is up")
    ),
    tag = "Status"
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
