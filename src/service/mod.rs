mod checker;
mod dataset_cache;
pub mod loader;

pub use checker::{find_containing, resolve_location, CheckerConfig, CloudIpChecker};
pub use dataset_cache::{DatasetCache, DatasetStatus, LoadState};
pub use loader::DatasetSource;
