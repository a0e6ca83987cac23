//! API data models
//!
//! This module defines the data structures used in API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::metrics::MetricsSnapshot;
use crate::model::LookupResult;
use crate::service::DatasetStatus;

/// Upper bound on addresses per batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Error code (optional)
    pub code: Option<String>,
}

/// Batch lookup request
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchCheckRequest {
    /// Addresses to check (at most 100)
    pub addresses: Vec<String>,
}

/// Outcome for one address of a batch
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchCheckItem {
    /// Address as submitted
    pub address: String,

    /// Lookup result, absent when the address is malformed
    pub result: Option<LookupResult>,

    /// Error message for a malformed address
    pub error: Option<String>,
}

/// Dataset and lookup status
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Both datasets are loaded and lookups are answered
    pub ready: bool,

    /// Match strategy in use
    pub strategy: String,

    pub prefixes: DatasetStatus,

    pub geo_feed: DatasetStatus,

    pub metrics: MetricsSnapshot,
}

impl BatchCheckRequest {
    /// Validate batch size
    pub fn validate(&self) -> Result<(), String> {
        if self.addresses.is_empty() {
            return Err("At least one address is required".to_string());
        }
        if self.addresses.len() > MAX_BATCH_SIZE {
            return Err(format!("At most {} addresses per request", MAX_BATCH_SIZE));
        }
        Ok(())
    }
}
