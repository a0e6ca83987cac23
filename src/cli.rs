use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::model::MatchStrategy;
use crate::service::{CheckerConfig, DatasetSource};

pub const DEFAULT_PREFIXES: &str = "https://ip-ranges.amazonaws.com/ip-ranges.json";
pub const DEFAULT_GEO_FEED: &str = "data/geoipfeed.csv";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(name = "cloud-ip-check")]
#[command(author = "cloud-ip-check")]
#[command(version = "0.1.0")]
#[command(about = "Check whether IPv4 addresses belong to a cloud provider's published ranges", long_about = None)]
pub struct Args {
    /// Addresses to check (ignored with --serve)
    #[arg(value_name = "ADDRESS")]
    pub addresses: Vec<String>,

    /// Prefix manifest (JSON): URL or file path
    #[arg(short = 'p', long, env = "CHECK_PREFIXES")]
    pub prefixes: Option<String>,

    /// Geo-IP feed (CSV with header row): URL or file path
    #[arg(short = 'g', long, env = "CHECK_GEO_FEED")]
    pub geo_feed: Option<String>,

    /// Which range wins when several contain the address ("first-match" or "most-specific")
    #[arg(short = 's', long, env = "CHECK_STRATEGY")]
    pub strategy: Option<String>,

    /// Run the HTTP API instead of checking addresses once
    #[arg(long, env = "CHECK_SERVE")]
    pub serve: bool,

    /// Listen address for the HTTP API
    #[arg(short = 'l', long, env = "CHECK_LISTEN")]
    pub listen: Option<String>,

    /// Directory served at / alongside the API (e.g. the dataset files)
    #[arg(long, env = "CHECK_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Dataset fetch timeout in seconds
    #[arg(short = 't', long, env = "CHECK_TIMEOUT")]
    pub timeout: Option<u64>,

    /// TOML config file; command-line and environment values take precedence
    #[arg(short = 'c', long, env = "CHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long, env = "CHECK_VERBOSE")]
    pub verbose: bool,
}

/// Optional settings read from the TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub prefixes: Option<String>,
    pub geo_feed: Option<String>,
    pub strategy: Option<String>,
    pub serve: Option<bool>,
    pub listen: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub addresses: Vec<String>,
    pub checker: CheckerConfig,
    pub serve: bool,
    pub listen: String,
    pub static_dir: Option<PathBuf>,
    pub verbose: bool,
}

impl Args {
    /// Fill unset options from the config file (if any) and built-in defaults
    pub fn merge_with_config(self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    fn merge(self, file: FileConfig) -> Result<Settings> {
        let prefixes: DatasetSource = self
            .prefixes
            .or(file.prefixes)
            .as_deref()
            .unwrap_or(DEFAULT_PREFIXES)
            .parse()
            .context("Invalid prefix manifest source")?;
        let geo_feed: DatasetSource = self
            .geo_feed
            .or(file.geo_feed)
            .as_deref()
            .unwrap_or(DEFAULT_GEO_FEED)
            .parse()
            .context("Invalid geo-feed source")?;
        let strategy = match self.strategy.or(file.strategy) {
            Some(s) => s.parse::<MatchStrategy>()?,
            None => MatchStrategy::default(),
        };
        let timeout = self.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Settings {
            addresses: self.addresses,
            checker: CheckerConfig {
                prefixes,
                geo_feed,
                strategy,
                timeout: Duration::from_secs(timeout),
            },
            serve: self.serve || file.serve.unwrap_or(false),
            listen: self
                .listen
                .or(file.listen)
                .unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
            static_dir: self.static_dir.or(file.static_dir),
            verbose: self.verbose || file.verbose.unwrap_or(false),
        })
    }
}
