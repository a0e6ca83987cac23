mod cidr;
mod dataset;
mod geo;
mod lookup;
mod prefix;
pub mod region;

pub use cidr::{ip_to_number, is_ip_in_cidr, number_to_ip, Cidr};
pub use dataset::{Dataset, GeoFeed, PrefixList, RangeEntry};
pub use geo::{GeoFeedEntry, LocationRecord, UNKNOWN};
pub use lookup::{LookupResult, MatchStrategy};
pub use prefix::PrefixEntry;
