//! Cache-aside lookups for every record kind
//!
//! Each lookup checks the cache first and only calls the record source on a
//! miss. A fetched record is written back before it is returned. Fetch
//! failures propagate unchanged and leave the cache untouched; there is no
//! retry.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::cache::{
    Namespace, NamespacedCache, NearbyPlaces, SiteDetail, StateIndex, StateSiteList, StoreError,
};
use crate::data::{NationalSite, NpsClient, NpsError, PlacesClient, PlacesError};

/// Errors that can occur during a lookup
#[derive(Debug, Error)]
pub enum LookupError {
    /// Fetching or reading an nps.gov page failed
    #[error("nps.gov: {0}")]
    Nps(#[from] NpsError),

    /// Fetching nearby places failed
    #[error("places search: {0}")]
    Places(#[from] PlacesError),

    /// The fetched record could not be written to the cache
    #[error("cache: {0}")]
    Store(#[from] StoreError),
}

/// Where a lookup result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Served from the cache file
    Cache,
    /// Fetched from the network and then cached
    Fetch,
}

/// A lookup result tagged with its origin
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    /// The record
    pub value: T,
    /// Whether the record was cached or fetched
    pub origin: Origin,
}

impl<T> Lookup<T> {
    fn cached(value: T) -> Self {
        Self {
            value,
            origin: Origin::Cache,
        }
    }

    fn fetched(value: T) -> Self {
        Self {
            value,
            origin: Origin::Fetch,
        }
    }
}

/// A site of a state listing, with its detail record
#[derive(Debug, Clone, PartialEq)]
pub struct SiteEntry {
    /// The site's nps.gov URL
    pub url: String,
    /// The site's detail record
    pub site: NationalSite,
}

/// Where records come from on a cache miss
#[async_trait]
pub trait SiteSource: Send + Sync {
    /// Fetches the full state name to state URL map
    async fn fetch_state_index(&self) -> Result<BTreeMap<String, String>, NpsError>;

    /// Fetches one site's detail record
    async fn fetch_site(&self, site_url: &str) -> Result<NationalSite, NpsError>;

    /// Fetches the ordered site URLs for a state
    async fn fetch_state_sites(&self, state_url: &str) -> Result<Vec<String>, NpsError>;

    /// Fetches the raw nearby places response for a postal code
    async fn fetch_nearby(&self, zip_code: &str) -> Result<Value, PlacesError>;
}

/// Record source backed by nps.gov and the MapQuest API
#[derive(Debug, Clone)]
pub struct WebSource {
    nps: NpsClient,
    places: PlacesClient,
}

impl WebSource {
    /// Create a new WebSource over the nps.gov and places clients
    pub fn new(nps: NpsClient, places: PlacesClient) -> Self {
        Self { nps, places }
    }
}

#[async_trait]
impl SiteSource for WebSource {
    async fn fetch_state_index(&self) -> Result<BTreeMap<String, String>, NpsError> {
        self.nps.fetch_state_index().await
    }

    async fn fetch_site(&self, site_url: &str) -> Result<NationalSite, NpsError> {
        self.nps.fetch_site(site_url).await
    }

    async fn fetch_state_sites(&self, state_url: &str) -> Result<Vec<String>, NpsError> {
        self.nps.fetch_state_sites(state_url).await
    }

    async fn fetch_nearby(&self, zip_code: &str) -> Result<Value, PlacesError> {
        self.places.fetch_nearby(zip_code).await
    }
}

/// Performs cache-aside lookups against a record source
#[derive(Debug, Clone)]
pub struct SiteLookup<S> {
    cache: NamespacedCache,
    source: S,
}

impl<S: SiteSource> SiteLookup<S> {
    /// Create a new SiteLookup that consults `cache` before `source`
    pub fn new(cache: NamespacedCache, source: S) -> Self {
        Self { cache, source }
    }

    /// Returns the cache this lookup reads and writes
    pub fn cache(&self) -> &NamespacedCache {
        &self.cache
    }

    /// Returns the record source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Checks namespace `N` for `key`, logging the outcome
    fn cached<N: Namespace>(&self, key: &str) -> Option<N::Record> {
        let hit = self.cache.get::<N>(key);
        log_outcome::<N>(key, hit.is_some());
        hit
    }

    /// State name to state URL map, fetched wholesale on a miss
    pub async fn state_index(&self) -> Result<Lookup<BTreeMap<String, String>>, LookupError> {
        if let Some(index) = self.cache.get_all::<StateIndex>() {
            log_outcome::<StateIndex>("*", true);
            return Ok(Lookup::cached(index));
        }
        log_outcome::<StateIndex>("*", false);

        let index = self.source.fetch_state_index().await?;
        self.cache.put::<StateIndex, _>(index.clone())?;
        Ok(Lookup::fetched(index))
    }

    /// Detail record for the site at `site_url`
    pub async fn site(&self, site_url: &str) -> Result<Lookup<NationalSite>, LookupError> {
        if let Some(site) = self.cached::<SiteDetail>(site_url) {
            return Ok(Lookup::cached(site));
        }

        let site = self.source.fetch_site(site_url).await?;
        self.cache.put_one::<SiteDetail>(site_url, site.clone())?;
        Ok(Lookup::fetched(site))
    }

    /// Ordered site URLs listed on the state page at `state_url`
    pub async fn state_sites(&self, state_url: &str) -> Result<Lookup<Vec<String>>, LookupError> {
        if let Some(sites) = self.cached::<StateSiteList>(state_url) {
            return Ok(Lookup::cached(sites));
        }

        let sites = self.source.fetch_state_sites(state_url).await?;
        self.cache
            .put_one::<StateSiteList>(state_url, sites.clone())?;
        Ok(Lookup::fetched(sites))
    }

    /// Raw nearby places response for a site
    ///
    /// Keyed by the site URL, so sites that share a name do not collide. The
    /// search is centred on the site's postal code.
    pub async fn nearby_places(
        &self,
        site_url: &str,
        site: &NationalSite,
    ) -> Result<Lookup<Value>, LookupError> {
        if let Some(places) = self.cached::<NearbyPlaces>(site_url) {
            return Ok(Lookup::cached(places));
        }

        let places = self.source.fetch_nearby(&site.zip_code).await?;
        self.cache
            .put_one::<NearbyPlaces>(site_url, places.clone())?;
        Ok(Lookup::fetched(places))
    }

    /// Every site of a state, in listing order, with detail records
    pub async fn sites_for_state(&self, state_url: &str) -> Result<Vec<SiteEntry>, LookupError> {
        let urls = self.state_sites(state_url).await?.value;
        let mut entries = Vec::with_capacity(urls.len());
        for url in urls {
            let site = self.site(&url).await?.value;
            entries.push(SiteEntry { url, site });
        }
        Ok(entries)
    }
}

fn log_outcome<N: Namespace>(key: &str, hit: bool) {
    if hit {
        tracing::info!(namespace = N::NAME, key, "using cache");
    } else {
        tracing::info!(namespace = N::NAME, key, "fetching");
    }
}
