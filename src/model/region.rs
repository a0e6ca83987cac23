//! Static metadata for provider regions.
//!
//! The geo-feed carries no coordinates, so each region is pinned to the
//! coordinates of the city hosting it and to the ISO country/subdivision pair
//! used as the key into the feed.

/// `(region, latitude, longitude)`
const REGION_COORDINATES: &[(&str, f64, f64)] = &[
    ("us-east-1", 39.0438, -77.4874),
    ("us-west-1", 37.3382, -121.8863),
    ("us-west-2", 45.5155, -122.6789),
    ("eu-west-1", 53.3498, -6.2603),
    ("eu-central-1", 50.1109, 8.6821),
    ("ap-southeast-1", 1.3521, 103.8198),
    ("ap-northeast-1", 35.6762, 139.6503),
    ("ap-southeast-2", -33.8688, 151.2093),
];

/// `(region, ISO country code, ISO subdivision code)`
const REGION_SUBDIVISIONS: &[(&str, &str, &str)] = &[
    ("us-east-1", "US", "US-VA"),
    ("us-west-1", "US", "US-CA"),
    ("us-west-2", "US", "US-OR"),
    ("eu-west-1", "IE", "IE-D"),
    ("eu-central-1", "DE", "DE-HE"),
    ("ap-southeast-1", "SG", "SG-01"),
    ("ap-northeast-1", "JP", "JP-13"),
    ("ap-southeast-2", "AU", "AU-NSW"),
];

const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("US", "USA"),
    ("IE", "Ireland"),
    ("DE", "Germany"),
    ("SG", "Singapore"),
    ("JP", "Japan"),
    ("AU", "Australia"),
];

/// Where a region lives in ISO 3166 terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSubdivision {
    pub country: &'static str,
    pub subdivision: &'static str,
}

pub fn region_coordinates(region: &str) -> Option<(f64, f64)> {
    REGION_COORDINATES
        .iter()
        .find(|(code, _, _)| *code == region)
        .map(|&(_, lat, lon)| (lat, lon))
}

pub fn region_subdivision(region: &str) -> Option<RegionSubdivision> {
    REGION_SUBDIVISIONS
        .iter()
        .find(|(code, _, _)| *code == region)
        .map(|&(_, country, subdivision)| RegionSubdivision {
            country,
            subdivision,
        })
}

/// Display name for a country code; unlisted codes are returned unchanged
pub fn country_name(code: &str) -> &str {
    COUNTRY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|&(_, name)| name)
        .unwrap_or(code)
}
