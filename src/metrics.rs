use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct LookupMetrics {
    total_lookups: Arc<AtomicU64>,
    not_ready: Arc<AtomicU64>,
    format_errors: Arc<AtomicU64>,
    provider_matches: Arc<AtomicU64>,
    geo_matches: Arc<AtomicU64>,
    start_time: Arc<Instant>,
}

/// Point-in-time copy of the lookup counters
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    pub total_lookups: u64,
    pub not_ready: u64,
    pub format_errors: u64,
    pub provider_matches: u64,
    pub geo_matches: u64,
    /// Percentage of answered lookups that hit a provider prefix
    pub provider_match_rate: f64,
    pub uptime_secs: f64,
}

impl LookupMetrics {
    pub fn new() -> Self {
        LookupMetrics {
            total_lookups: Arc::new(AtomicU64::new(0)),
            not_ready: Arc::new(AtomicU64::new(0)),
            format_errors: Arc::new(AtomicU64::new(0)),
            provider_matches: Arc::new(AtomicU64::new(0)),
            geo_matches: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }

    pub fn increment_lookups(&self) {
        self.total_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_not_ready(&self) {
        self.not_ready.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_format_errors(&self) {
        self.format_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_provider_matches(&self) {
        self.provider_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_geo_matches(&self) {
        self.geo_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_lookups(&self) -> u64 {
        self.total_lookups.load(Ordering::Relaxed)
    }

    pub fn get_not_ready(&self) -> u64 {
        self.not_ready.load(Ordering::Relaxed)
    }

    pub fn get_format_errors(&self) -> u64 {
        self.format_errors.load(Ordering::Relaxed)
    }

    pub fn get_provider_matches(&self) -> u64 {
        self.provider_matches.load(Ordering::Relaxed)
    }

    pub fn get_geo_matches(&self) -> u64 {
        self.geo_matches.load(Ordering::Relaxed)
    }

    /// Provider matches over lookups that were actually scanned
    pub fn get_provider_match_rate(&self) -> f64 {
        let answered = self
            .get_lookups()
            .saturating_sub(self.get_not_ready())
            .saturating_sub(self.get_format_errors());
        if answered > 0 {
            self.get_provider_matches() as f64 / answered as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_lookups: self.get_lookups(),
            not_ready: self.get_not_ready(),
            format_errors: self.get_format_errors(),
            provider_matches: self.get_provider_matches(),
            geo_matches: self.get_geo_matches(),
            provider_match_rate: self.get_provider_match_rate(),
            uptime_secs: self.start_time.elapsed().as_secs_f64(),
        }
    }

    pub fn print_summary(&self) {
        tracing::info!("=== Lookup Metrics Summary ===");
        tracing::info!("  Total lookups: {}", self.get_lookups());
        tracing::info!("  Before datasets loaded: {}", self.get_not_ready());
        tracing::info!("  Malformed addresses: {}", self.get_format_errors());
        tracing::info!("  Provider matches: {}", self.get_provider_matches());
        tracing::info!("  Geo-feed matches: {}", self.get_geo_matches());
        tracing::info!("  Provider match rate: {:.2}%", self.get_provider_match_rate());
    }
}

impl Default for LookupMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_counters() {
        let metrics = LookupMetrics::new();

        metrics.increment_lookups();
        metrics.increment_lookups();
        assert_eq!(metrics.get_lookups(), 2);

        metrics.increment_provider_matches();
        assert_eq!(metrics.get_provider_matches(), 1);

        metrics.increment_geo_matches();
        assert_eq!(metrics.get_geo_matches(), 1);

        metrics.increment_format_errors();
        assert_eq!(metrics.get_format_errors(), 1);

        metrics.increment_not_ready();
        assert_eq!(metrics.get_not_ready(), 1);
    }

    #[test]
    fn test_metrics_rates() {
        let metrics = LookupMetrics::new();

        // 10 lookups, 2 before load, 3 malformed, 4 matches out of the 5 answered
        for _ in 0..10 { metrics.increment_lookups(); }
        for _ in 0..2 { metrics.increment_not_ready(); }
        for _ in 0..3 { metrics.increment_format_errors(); }
        for _ in 0..4 { metrics.increment_provider_matches(); }

        assert_eq!(metrics.get_provider_match_rate(), 80.0);
        assert_eq!(LookupMetrics::new().get_provider_match_rate(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = LookupMetrics::new();
        let other = metrics.clone();
        other.increment_lookups();
        assert_eq!(metrics.snapshot().total_lookups, 1);
    }
}
