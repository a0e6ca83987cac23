use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::Cidr;

/// One row of the geo-IP feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoFeedEntry {
    #[schema(value_type = String, example = "3.5.140.0/22")]
    pub ip: Cidr,
    pub country_code: String,
    pub region_code: String,
    /// City name
    pub location: String,
    /// Any other columns from the feed, keyed by header name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl GeoFeedEntry {
    pub fn new(ip: Cidr, country_code: &str, region_code: &str, location: &str) -> Self {
        Self {
            ip,
            country_code: country_code.to_string(),
            region_code: region_code.to_string(),
            location: location.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

/// Approximate location of a provider region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationRecord {
    pub city: String,
    pub country: String,
    /// `(latitude, longitude)` when the region is known
    #[schema(value_type = Option<Vec<f64>>)]
    pub coordinates: Option<(f64, f64)>,
}

impl LocationRecord {
    pub fn unknown(country: &str) -> Self {
        Self {
            city: UNKNOWN.to_string(),
            country: country.to_string(),
            coordinates: None,
        }
    }
}

pub const UNKNOWN: &str = "Unknown";
