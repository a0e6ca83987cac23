use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CheckError;
use crate::model::{GeoFeedEntry, LocationRecord};

/// Result of checking one address, ready for display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    /// Trimmed input address
    pub ip: String,

    /// A provider prefix or a geo-feed range contains the address
    pub is_match: bool,

    /// A provider prefix contains the address
    #[serde(rename = "isProviderIP")]
    pub is_provider_ip: bool,

    pub region: String,

    pub service: String,

    /// Resolved from the region of the matching provider prefix
    pub location: Option<LocationRecord>,

    /// Matching geo-feed row, if any
    pub geo: Option<GeoFeedEntry>,
}

impl LookupResult {
    /// Result reported when the datasets are not available
    pub fn empty(ip: &str) -> Self {
        Self {
            ip: ip.to_string(),
            ..Default::default()
        }
    }
}

/// Which entry wins when several ranges contain the address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// First containing entry in dataset order
    #[default]
    FirstMatch,
    /// Longest containing prefix, dataset order breaks ties
    MostSpecific,
}

impl FromStr for MatchStrategy {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-match" | "first" => Ok(MatchStrategy::FirstMatch),
            "most-specific" | "longest" => Ok(MatchStrategy::MostSpecific),
            other => Err(CheckError::Config(format!(
                "Unknown match strategy '{}': expected 'first-match' or 'most-specific'",
                other
            ))),
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::FirstMatch => write!(f, "first-match"),
            MatchStrategy::MostSpecific => write!(f, "most-specific"),
        }
    }
}
