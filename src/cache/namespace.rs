//! Typed namespaces layered over the cache file
//!
//! Each record kind lives in its own namespace of the cache file. A namespace
//! is a marker type naming the section of `CacheFile` it owns and the record
//! type stored there, so lookups never go through an untyped mapping.

use serde_json::Value;
use std::collections::BTreeMap;

use super::store::{CacheFile, CacheStore, StoreError};
use crate::data::NationalSite;

/// A section of the cache file holding one record kind
pub trait Namespace {
    /// Name of the namespace as persisted in the cache file
    const NAME: &'static str;

    /// Record stored under each key
    type Record: Clone;

    /// Read access to this namespace's entries
    fn entries(file: &CacheFile) -> &BTreeMap<String, Self::Record>;

    /// Write access to this namespace's entries
    fn entries_mut(file: &mut CacheFile) -> &mut BTreeMap<String, Self::Record>;
}

/// Lowercase state name to state listing URL
#[derive(Debug, Clone, Copy)]
pub struct StateIndex;

/// Site URL to site record
#[derive(Debug, Clone, Copy)]
pub struct SiteDetail;

/// State listing URL to the ordered site URLs for that state
#[derive(Debug, Clone, Copy)]
pub struct StateSiteList;

/// Site URL to the raw places API response
#[derive(Debug, Clone, Copy)]
pub struct NearbyPlaces;

impl Namespace for StateIndex {
    const NAME: &'static str = "StateIndex";
    type Record = String;

    fn entries(file: &CacheFile) -> &BTreeMap<String, String> {
        &file.state_index
    }

    fn entries_mut(file: &mut CacheFile) -> &mut BTreeMap<String, String> {
        &mut file.state_index
    }
}

impl Namespace for SiteDetail {
    const NAME: &'static str = "SiteDetail";
    type Record = NationalSite;

    fn entries(file: &CacheFile) -> &BTreeMap<String, NationalSite> {
        &file.site_detail
    }

    fn entries_mut(file: &mut CacheFile) -> &mut BTreeMap<String, NationalSite> {
        &mut file.site_detail
    }
}

impl Namespace for StateSiteList {
    const NAME: &'static str = "StateSiteList";
    type Record = Vec<String>;

    fn entries(file: &CacheFile) -> &BTreeMap<String, Vec<String>> {
        &file.state_site_list
    }

    fn entries_mut(file: &mut CacheFile) -> &mut BTreeMap<String, Vec<String>> {
        &mut file.state_site_list
    }
}

impl Namespace for NearbyPlaces {
    const NAME: &'static str = "NearbyPlaces";
    type Record = Value;

    fn entries(file: &CacheFile) -> &BTreeMap<String, Value> {
        &file.nearby_places
    }

    fn entries_mut(file: &mut CacheFile) -> &mut BTreeMap<String, Value> {
        &mut file.nearby_places
    }
}

/// Namespaced access to the cache file
///
/// Every call re-reads the file through the store; every write loads, merges
/// and saves the whole file.
#[derive(Debug, Clone)]
pub struct NamespacedCache {
    store: CacheStore,
}

impl NamespacedCache {
    /// Creates a cache over the given store
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Returns the underlying store
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Returns the record under `key` in namespace `N`, if present
    pub fn get<N: Namespace>(&self, key: &str) -> Option<N::Record> {
        let file = self.store.load().into_file();
        N::entries(&file).get(key).cloned()
    }

    /// Returns every entry of namespace `N`, or `None` when it is empty
    pub fn get_all<N: Namespace>(&self) -> Option<BTreeMap<String, N::Record>> {
        let mut file = self.store.load().into_file();
        let entries = std::mem::take(N::entries_mut(&mut file));
        if entries.is_empty() {
            None
        } else {
            Some(entries)
        }
    }

    /// Merges `entries` into namespace `N` and saves the file
    ///
    /// New keys are added and existing keys are overwritten; keys not in
    /// `entries` are kept as they are.
    pub fn put<N, I>(&self, entries: I) -> Result<(), StoreError>
    where
        N: Namespace,
        I: IntoIterator<Item = (String, N::Record)>,
    {
        let mut file = self.store.load().into_file();
        let target = N::entries_mut(&mut file);
        let before = target.len();
        target.extend(entries);
        tracing::debug!(
            namespace = N::NAME,
            added = target.len() - before,
            "merging into cache"
        );
        self.store.save(&file)
    }

    /// Stores a single record under `key` in namespace `N`
    pub fn put_one<N: Namespace>(
        &self,
        key: impl Into<String>,
        record: N::Record,
    ) -> Result<(), StoreError> {
        self.put::<N, _>([(key.into(), record)])
    }
}
