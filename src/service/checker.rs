//! Address lookup against the loaded datasets
//!
//! [`CloudIpChecker`] owns both dataset caches and the match strategy. It is
//! cheap to clone; clones share the same caches and counters.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{CheckError, Result};
use crate::metrics::LookupMetrics;
use crate::model::region::{country_name, region_coordinates, region_subdivision};
use crate::model::{
    ip_to_number, GeoFeed, LocationRecord, LookupResult, MatchStrategy, PrefixList, RangeEntry,
    UNKNOWN,
};
use crate::service::dataset_cache::{DatasetCache, DatasetStatus};
use crate::service::loader::{self, DatasetSource};

/// Where to load the datasets from and how to match against them
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub prefixes: DatasetSource,
    pub geo_feed: DatasetSource,
    pub strategy: MatchStrategy,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct CloudIpChecker {
    inner: Arc<Inner>,
}

struct Inner {
    prefixes: DatasetCache<PrefixList>,
    geo_feed: DatasetCache<GeoFeed>,
    sources: Option<(DatasetSource, DatasetSource)>,
    client: reqwest::Client,
    strategy: MatchStrategy,
    metrics: LookupMetrics,
}

impl CloudIpChecker {
    /// Checker with empty caches; call [`CloudIpChecker::load`] to fill them
    pub fn new(config: CheckerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CheckError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(Inner {
                prefixes: DatasetCache::new("prefixes"),
                geo_feed: DatasetCache::new("geo-feed"),
                sources: Some((config.prefixes, config.geo_feed)),
                client,
                strategy: config.strategy,
                metrics: LookupMetrics::new(),
            }),
        })
    }

    /// Checker over datasets that are already in memory
    pub fn from_datasets(strategy: MatchStrategy, prefixes: PrefixList, geo_feed: GeoFeed) -> Self {
        Self {
            inner: Arc::new(Inner {
                prefixes: DatasetCache::with_data("prefixes", prefixes),
                geo_feed: DatasetCache::with_data("geo-feed", geo_feed),
                sources: None,
                client: reqwest::Client::new(),
                strategy,
                metrics: LookupMetrics::new(),
            }),
        }
    }

    /// Fetch both datasets concurrently.
    ///
    /// Only the first call fetches anything. Failures are logged and leave the
    /// affected cache empty.
    pub async fn load(&self) {
        let Some((prefix_source, geo_source)) = &self.inner.sources else {
            return;
        };
        let client = &self.inner.client;

        info!("Loading prefixes from {}", prefix_source);
        info!("Loading geo-feed from {}", geo_source);
        futures::join!(
            self.inner
                .prefixes
                .load_with(|| loader::load_prefixes(client, prefix_source)),
            self.inner
                .geo_feed
                .load_with(|| loader::load_geo_feed(client, geo_source)),
        );
    }

    /// Both datasets are loaded
    pub fn is_ready(&self) -> bool {
        self.inner.prefixes.get().is_some() && self.inner.geo_feed.get().is_some()
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.inner.strategy
    }

    pub fn metrics(&self) -> &LookupMetrics {
        &self.inner.metrics
    }

    pub fn prefixes_status(&self) -> DatasetStatus {
        self.inner.prefixes.status()
    }

    pub fn geo_feed_status(&self) -> DatasetStatus {
        self.inner.geo_feed.status()
    }

    /// Look up one address.
    ///
    /// Until both datasets are loaded every address yields an empty no-match
    /// result. After that a malformed address is a `Format` error.
    pub fn check_address(&self, input: &str) -> Result<LookupResult> {
        let ip = input.trim();
        let metrics = &self.inner.metrics;
        metrics.increment_lookups();

        let (Some(prefixes), Some(geo_feed)) = (self.inner.prefixes.get(), self.inner.geo_feed.get())
        else {
            debug!("Datasets not loaded, reporting no match for {}", ip);
            metrics.increment_not_ready();
            return Ok(LookupResult::empty(ip));
        };

        let ip_num = ip_to_number(ip).map_err(|e| {
            metrics.increment_format_errors();
            e
        })?;

        let mut result = LookupResult::empty(ip);

        if let Some(entry) = find_containing(&prefixes.entries, ip_num, self.inner.strategy) {
            debug!("{} is in {} ({} / {})", ip, entry.ip_prefix, entry.region, entry.service);
            metrics.increment_provider_matches();
            result.is_provider_ip = true;
            result.region = entry.region.clone();
            result.service = entry.service.clone();
            result.location = Some(resolve_location(&entry.region, &geo_feed));
        }

        if let Some(entry) = find_containing(&geo_feed.entries, ip_num, self.inner.strategy) {
            metrics.increment_geo_matches();
            result.geo = Some(entry.clone());
        }

        result.is_match = result.is_provider_ip || result.geo.is_some();
        Ok(result)
    }
}

/// Entry whose range contains `ip`, chosen according to `strategy`
pub fn find_containing<T: RangeEntry>(entries: &[T], ip: u32, strategy: MatchStrategy) -> Option<&T> {
    let mut hits = entries.iter().filter(|e| e.range().contains(ip));
    match strategy {
        MatchStrategy::FirstMatch => hits.next(),
        MatchStrategy::MostSpecific => hits.fold(None, |best: Option<&T>, entry| match best {
            Some(b) if b.range().prefix_len() >= entry.range().prefix_len() => Some(b),
            _ => Some(entry),
        }),
    }
}

/// Approximate location of a provider region
pub fn resolve_location(region: &str, geo_feed: &GeoFeed) -> LocationRecord {
    let coordinates = region_coordinates(region);

    match region_subdivision(region) {
        Some(sub) => LocationRecord {
            city: geo_feed
                .city_for(sub.country, sub.subdivision)
                .unwrap_or(UNKNOWN)
                .to_string(),
            country: country_name(sub.country).to_string(),
            coordinates,
        },
        None => {
            let mut record = LocationRecord::unknown(if region.is_empty() { UNKNOWN } else { region });
            record.coordinates = coordinates;
            record
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoFeedEntry, PrefixEntry};

    fn prefix(cidr: &str, region: &str, service: &str) -> PrefixEntry {
        PrefixEntry::new(cidr.parse().unwrap(), region, service)
    }

    fn geo(cidr: &str, country: &str, region: &str, city: &str) -> GeoFeedEntry {
        GeoFeedEntry::new(cidr.parse().unwrap(), country, region, city)
    }

    fn checker(strategy: MatchStrategy) -> CloudIpChecker {
        let prefixes = PrefixList::new(vec![
            prefix("52.0.0.0/8", "us-east-1", "AMAZON"),
            prefix("52.94.76.0/22", "eu-west-1", "EC2"),
            prefix("3.5.140.0/22", "ap-northeast-2", "S3"),
            prefix("15.230.0.0/16", "", "AMAZON"),
        ]);
        let geo_feed = GeoFeed::new(
            vec![
                geo("52.94.76.0/22", "IE", "IE-D", "Dublin"),
                geo("52.0.0.0/8", "US", "US-VA", "Ashburn"),
                geo("99.77.0.0/16", "DE", "DE-HE", "Frankfurt"),
            ],
            0,
        );
        CloudIpChecker::from_datasets(strategy, prefixes, geo_feed)
    }

    fn unloaded() -> CloudIpChecker {
        CloudIpChecker::new(CheckerConfig {
            prefixes: "missing/ip-ranges.json".parse().unwrap(),
            geo_feed: "missing/geoipfeed.csv".parse().unwrap(),
            strategy: MatchStrategy::FirstMatch,
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_not_loaded_returns_empty_result() {
        let checker = unloaded();
        assert!(!checker.is_ready());

        let result = checker.check_address(" 3.5.140.1 ").unwrap();
        assert_eq!(result, LookupResult::empty("3.5.140.1"));
        assert!(!result.is_match);
        assert!(!result.is_provider_ip);
        assert_eq!(result.region, "");
        assert_eq!(result.service, "");
        assert!(result.location.is_none());

        // Malformed input is not validated before the datasets exist
        assert!(checker.check_address("garbage").is_ok());
        assert_eq!(checker.metrics().get_not_ready(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_degrades_to_no_match() {
        let checker = unloaded();
        checker.load().await;

        assert!(!checker.is_ready());
        assert_eq!(checker.prefixes_status().state, crate::service::LoadState::Failed);
        assert_eq!(checker.geo_feed_status().state, crate::service::LoadState::Failed);
        assert!(!checker.check_address("52.94.76.1").unwrap().is_match);
    }

    #[tokio::test]
    async fn test_load_from_files_once() {
        use std::io::Write;

        let mut manifest = tempfile::NamedTempFile::new().unwrap();
        manifest
            .write_all(
                br#"{"prefixes": [
                    {"ip_prefix": "52.208.0.0/13", "region": "eu-west-1", "service": "EC2"},
                    {"ip_prefix": "2a05:d018::/36", "region": "eu-west-1", "service": "EC2"},
                    {"region": "eu-west-1", "service": "S3"}
                ]}"#,
            )
            .unwrap();
        let mut feed = tempfile::NamedTempFile::new().unwrap();
        feed.write_all(b"ip,country_code,region_code,location\n52.208.0.0/13,IE,IE-D,Dublin\n")
            .unwrap();

        let checker = CloudIpChecker::new(CheckerConfig {
            prefixes: DatasetSource::File(manifest.path().to_path_buf()),
            geo_feed: DatasetSource::File(feed.path().to_path_buf()),
            strategy: MatchStrategy::FirstMatch,
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        futures::join!(checker.load(), checker.load());
        checker.load().await;

        assert!(checker.is_ready());
        let prefixes = checker.prefixes_status();
        assert_eq!(prefixes.state, crate::service::LoadState::Loaded);
        assert_eq!(prefixes.entries, 1);
        assert_eq!(prefixes.skipped, 2);
        assert!(prefixes.loaded_at.is_some());
        let geo_feed = checker.geo_feed_status();
        assert_eq!(geo_feed.state, crate::service::LoadState::Loaded);
        assert_eq!(geo_feed.entries, 1);

        let result = checker.check_address(" 52.210.1.1 ").unwrap();
        assert_eq!(result.ip, "52.210.1.1");
        assert!(result.is_match);
        assert!(result.is_provider_ip);
        assert_eq!(result.region, "eu-west-1");
        assert_eq!(result.service, "EC2");
        let location = result.location.unwrap();
        assert_eq!(location.city, "Dublin");
        assert_eq!(location.country, "Ireland");
        assert_eq!(location.coordinates, Some((53.3498, -6.2603)));
        assert_eq!(result.geo.unwrap().location, "Dublin");
    }

    #[test]
    fn test_first_match_wins() {
        let checker = checker(MatchStrategy::FirstMatch);
        let result = checker.check_address("52.94.76.10").unwrap();

        assert!(result.is_match);
        assert!(result.is_provider_ip);
        assert_eq!(result.region, "us-east-1");
        assert_eq!(result.service, "AMAZON");
        // The geo scan is independent and also takes its first hit
        assert_eq!(result.geo.unwrap().location, "Dublin");
    }

    #[test]
    fn test_most_specific_wins() {
        let checker = checker(MatchStrategy::MostSpecific);
        let result = checker.check_address("52.94.76.10").unwrap();

        assert_eq!(result.region, "eu-west-1");
        assert_eq!(result.service, "EC2");

        let location = result.location.unwrap();
        assert_eq!(location.city, "Dublin");
        assert_eq!(location.country, "Ireland");
        assert_eq!(location.coordinates, Some((53.3498, -6.2603)));
    }

    #[test]
    fn test_eu_west_1_without_geo_city() {
        let prefixes = PrefixList::new(vec![prefix("52.94.76.0/22", "eu-west-1", "EC2")]);
        let checker = CloudIpChecker::from_datasets(MatchStrategy::FirstMatch, prefixes, GeoFeed::default());

        let location = checker.check_address("52.94.76.1").unwrap().location.unwrap();
        assert_eq!(location.city, "Unknown");
        assert_eq!(location.country, "Ireland");
        assert_eq!(location.coordinates, Some((53.3498, -6.2603)));
    }

    #[test]
    fn test_unknown_region_echoes_code() {
        let checker = checker(MatchStrategy::FirstMatch);
        let result = checker.check_address("3.5.140.1").unwrap();

        assert!(result.is_provider_ip);
        assert!(result.geo.is_none());
        let location = result.location.unwrap();
        assert_eq!(location.country, "ap-northeast-2");
        assert_eq!(location.city, "Unknown");
        assert_eq!(location.coordinates, None);

        let empty_region = checker.check_address("15.230.1.1").unwrap().location.unwrap();
        assert_eq!(empty_region.country, "Unknown");
    }

    #[test]
    fn test_geo_only_match() {
        let checker = checker(MatchStrategy::FirstMatch);
        let result = checker.check_address("99.77.1.1").unwrap();

        assert!(result.is_match);
        assert!(!result.is_provider_ip);
        assert_eq!(result.region, "");
        assert!(result.location.is_none());
        assert_eq!(result.geo.unwrap().country_code, "DE");
    }

    #[test]
    fn test_no_match() {
        let checker = checker(MatchStrategy::FirstMatch);
        let result = checker.check_address("8.8.8.8").unwrap();
        assert_eq!(result, LookupResult::empty("8.8.8.8"));
        assert_eq!(checker.metrics().get_provider_matches(), 0);
    }

    #[test]
    fn test_malformed_address_fails_fast() {
        let checker = checker(MatchStrategy::FirstMatch);
        for input in ["1.2.3", "256.1.1.1", "a.b.c.d", ""] {
            let err = checker.check_address(input).unwrap_err();
            assert!(err.is_format(), "{:?} should be a format error", input);
        }
        assert_eq!(checker.metrics().get_format_errors(), 4);
    }

    #[test]
    fn test_find_containing_ties_keep_source_order() {
        let entries = vec![
            prefix("10.0.0.0/16", "first", "A"),
            prefix("10.0.0.0/16", "second", "B"),
            prefix("10.0.0.0/8", "wide", "C"),
        ];
        let ip = ip_to_number("10.0.1.1").unwrap();

        let first = find_containing(&entries, ip, MatchStrategy::FirstMatch).unwrap();
        assert_eq!(first.region, "first");
        let specific = find_containing(&entries, ip, MatchStrategy::MostSpecific).unwrap();
        assert_eq!(specific.region, "first");
        assert!(find_containing(&entries, ip_to_number("11.0.0.1").unwrap(), MatchStrategy::MostSpecific).is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let checker = checker(MatchStrategy::FirstMatch);
        let other = checker.clone();
        other.check_address("8.8.8.8").unwrap();
        assert_eq!(checker.metrics().get_lookups(), 1);
        assert_eq!(checker.strategy(), MatchStrategy::FirstMatch);
    }
}
