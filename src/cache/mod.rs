//! Cache module for storing fetched records to disk
//!
//! All records live in one JSON file, split into four namespaces: the state
//! index, site details, per-state site lists and nearby places. The file is
//! read whole on every lookup and rewritten whole on every write. Entries
//! never expire; deleting the file is the only way to reset it.

mod namespace;
mod store;

pub use namespace::{
    Namespace, NamespacedCache, NearbyPlaces, SiteDetail, StateIndex, StateSiteList,
};
pub use store::{CacheFile, CacheStore, EmptyReason, Loaded, StoreError, DEFAULT_CACHE_FILE};
