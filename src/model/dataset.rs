use std::collections::HashMap;

use crate::model::{Cidr, GeoFeedEntry, PrefixEntry};

/// A dataset row that covers an address range
pub trait RangeEntry {
    fn range(&self) -> &Cidr;
}

impl RangeEntry for PrefixEntry {
    fn range(&self) -> &Cidr {
        &self.ip_prefix
    }
}

impl RangeEntry for GeoFeedEntry {
    fn range(&self) -> &Cidr {
        &self.ip
    }
}

/// A parsed dataset as held in the lookup cache
pub trait Dataset: Send + Sync + 'static {
    /// Number of usable rows
    fn len(&self) -> usize;

    /// Rows dropped while parsing
    fn skipped(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Provider prefix manifest, in source order
#[derive(Debug, Clone, Default)]
pub struct PrefixList {
    pub entries: Vec<PrefixEntry>,
    pub skipped: usize,
}

impl PrefixList {
    pub fn new(entries: Vec<PrefixEntry>) -> Self {
        Self { entries, skipped: 0 }
    }
}

impl Dataset for PrefixList {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Geo-IP feed rows plus a city index keyed by `(country_code, region_code)`
#[derive(Debug, Clone, Default)]
pub struct GeoFeed {
    pub entries: Vec<GeoFeedEntry>,
    pub skipped: usize,
    cities: HashMap<(String, String), String>,
}

impl GeoFeed {
    pub fn new(entries: Vec<GeoFeedEntry>, skipped: usize) -> Self {
        let mut cities = HashMap::new();
        for entry in &entries {
            if entry.country_code.is_empty()
                || entry.region_code.is_empty()
                || entry.location.is_empty()
            {
                continue;
            }
            // Later rows replace earlier ones for the same key
            cities.insert(
                (entry.country_code.clone(), entry.region_code.clone()),
                entry.location.clone(),
            );
        }
        Self {
            entries,
            skipped,
            cities,
        }
    }

    pub fn city_for(&self, country_code: &str, region_code: &str) -> Option<&str> {
        self.cities
            .get(&(country_code.to_string(), region_code.to_string()))
            .map(String::as_str)
    }
}

impl Dataset for GeoFeed {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ip: &str, country: &str, region: &str, city: &str) -> GeoFeedEntry {
        GeoFeedEntry::new(ip.parse().unwrap(), country, region, city)
    }

    #[test]
    fn test_city_index() {
        let feed = GeoFeed::new(
            vec![
                entry("3.5.140.0/22", "JP", "JP-13", "Tokyo"),
                entry("52.94.0.0/22", "US", "US-VA", "Ashburn"),
                entry("52.95.0.0/22", "US", "US-VA", "Sterling"),
                entry("54.0.0.0/16", "IE", "", "Dublin"),
            ],
            0,
        );
        assert_eq!(feed.len(), 4);
        assert_eq!(feed.city_for("JP", "JP-13"), Some("Tokyo"));
        assert_eq!(feed.city_for("US", "US-VA"), Some("Sterling"));
        assert_eq!(feed.city_for("IE", ""), None);
        assert_eq!(feed.city_for("IE", "IE-D"), None);
    }

    #[test]
    fn test_prefix_list_counts() {
        let list = PrefixList::new(vec![PrefixEntry::new(
            "3.5.140.0/22".parse().unwrap(),
            "ap-northeast-2",
            "AMAZON",
        )]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.skipped(), 0);
        assert!(!list.is_empty());
        assert!(PrefixList::default().is_empty());
    }
}
