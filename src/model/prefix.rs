use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::Cidr;

/// One row of the provider IP-range manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrefixEntry {
    #[schema(value_type = String, example = "3.5.140.0/22")]
    pub ip_prefix: Cidr,
    pub region: String,
    pub service: String,
}

impl PrefixEntry {
    pub fn new(ip_prefix: Cidr, region: &str, service: &str) -> Self {
        Self {
            ip_prefix,
            region: region.to_string(),
            service: service.to_string(),
        }
    }
}
