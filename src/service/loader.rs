//! Dataset fetching and parsing
//!
//! Both datasets are plain static resources: a JSON prefix manifest and a CSV
//! geo-feed. Each can live behind an HTTP(S) URL or in a local file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{CheckError, Result};
use crate::model::{Cidr, GeoFeed, GeoFeedEntry, PrefixEntry, PrefixList};

/// Header names accepted for the address column of the geo-feed
const IP_COLUMNS: &[&str] = &["ip", "ip_prefix", "prefix", "cidr", "network"];

/// Where a dataset is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Url(String),
    File(PathBuf),
}

impl FromStr for DatasetSource {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CheckError::Config("Dataset source must not be empty".to_string()));
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(DatasetSource::Url(s.to_string()))
        } else {
            Ok(DatasetSource::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Url(url) => write!(f, "{}", url),
            DatasetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Retrieve the raw text of a dataset
pub async fn fetch_text(client: &reqwest::Client, source: &DatasetSource) -> Result<String> {
    match source {
        DatasetSource::Url(url) => {
            debug!("Fetching {}", url);
            let response = client.get(url).send().await?.error_for_status()?;
            Ok(response.text().await?)
        }
        DatasetSource::File(path) => {
            debug!("Reading {}", path.display());
            Ok(tokio::fs::read_to_string(path).await?)
        }
    }
}

pub async fn load_prefixes(client: &reqwest::Client, source: &DatasetSource) -> Result<PrefixList> {
    let text = fetch_text(client, source).await?;
    parse_prefix_manifest(&text)
}

pub async fn load_geo_feed(client: &reqwest::Client, source: &DatasetSource) -> Result<GeoFeed> {
    let text = fetch_text(client, source).await?;
    parse_geo_feed(&text)
}

#[derive(Deserialize)]
struct RawManifest {
    prefixes: Vec<serde_json::Value>,
}

/// Parse a provider manifest (`{"prefixes": [{ip_prefix, region, service}, ...]}`).
///
/// Elements that lack a required field or carry a non-IPv4 prefix are skipped.
pub fn parse_prefix_manifest(text: &str) -> Result<PrefixList> {
    let raw: RawManifest = serde_json::from_str(text)?;

    let mut list = PrefixList::default();
    for (index, value) in raw.prefixes.into_iter().enumerate() {
        match serde_json::from_value::<PrefixEntry>(value) {
            Ok(entry) => list.entries.push(entry),
            Err(e) => {
                debug!("Skipping prefix #{}: {}", index, e);
                list.skipped += 1;
            }
        }
    }

    if list.skipped > 0 {
        warn!(
            "Skipped {} malformed prefix entries ({} kept)",
            list.skipped,
            list.entries.len()
        );
    }
    Ok(list)
}

/// Parse a geo-feed CSV with a header row, in any column order.
pub fn parse_geo_feed(text: &str) -> Result<GeoFeed> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    // Column names match case-insensitively; pass-through keys keep their header text
    let keys: Vec<String> = headers.iter().map(|h| h.to_ascii_lowercase()).collect();

    let ip_col = keys
        .iter()
        .position(|h| IP_COLUMNS.contains(&h.as_str()))
        .ok_or_else(|| {
            CheckError::Parse(format!(
                "Geo-feed must have one of the columns {}. Found headers: {}",
                IP_COLUMNS.join(", "),
                headers.join(", ")
            ))
        })?;

    let mut entries = Vec::new();
    let mut skipped = 0;

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let cell = record.get(ip_col).unwrap_or_default();
        let ip: Cidr = match cell.parse() {
            Ok(ip) => ip,
            Err(e) => {
                debug!("Skipping geo-feed row {}: {}", line + 2, e);
                skipped += 1;
                continue;
            }
        };

        let mut entry = GeoFeedEntry {
            ip,
            country_code: String::new(),
            region_code: String::new(),
            location: String::new(),
            extra: BTreeMap::new(),
        };

        for (col, (header, key)) in headers.iter().zip(&keys).enumerate() {
            if col == ip_col {
                continue;
            }
            let value = record.get(col).unwrap_or_default().to_string();
            match key.as_str() {
                "country_code" => entry.country_code = value,
                "region_code" => entry.region_code = value,
                "location" => entry.location = value,
                _ => {
                    entry.extra.insert(header.clone(), value);
                }
            }
        }

        entries.push(entry);
    }

    if skipped > 0 {
        warn!(
            "Skipped {} geo-feed rows without a valid IPv4 range ({} kept)",
            skipped,
            entries.len()
        );
    }
    Ok(GeoFeed::new(entries, skipped))
}
