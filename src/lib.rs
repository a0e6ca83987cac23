//! Cloud provider IPv4 lookup.
//!
//! Loads a provider prefix manifest and a geo-IP feed, then answers whether an
//! address lies in the provider's published ranges, with region, service and
//! approximate location.

pub mod api;
pub mod cli;
pub mod error;
pub mod metrics;
pub mod model;
pub mod server;
pub mod service;

pub use error::{CheckError, Result};
pub use model::{LookupResult, MatchStrategy};
pub use service::CloudIpChecker;
