//! nps.gov page client
//!
//! Fetches the nps.gov home page, state listing pages and site pages, and
//! extracts the state index, per-state site URLs and site details from them.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use super::NationalSite;

/// Base URL for nps.gov
const NPS_BASE_URL: &str = "https://www.nps.gov";

/// Errors that can occur when fetching or reading nps.gov pages
#[derive(Debug, Error)]
pub enum NpsError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// An element the page is expected to contain is missing
    #[error("Missing expected element in page: {0}")]
    MissingElement(String),
}

/// Client for fetching pages from nps.gov
#[derive(Debug, Clone)]
pub struct NpsClient {
    client: Client,
    /// Base URL for site links and the home page (allows override for testing)
    base_url: String,
}

impl Default for NpsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NpsClient {
    /// Create a new NpsClient pointing at nps.gov
    pub fn new() -> Self {
        Self::with_base_url(NPS_BASE_URL)
    }

    /// Create a new NpsClient with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetches a page and returns its body
    async fn fetch_page(&self, url: &str) -> Result<String, NpsError> {
        tracing::debug!(url, "fetching page");
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    /// Fetches the map of lowercase state names to state listing URLs
    pub async fn fetch_state_index(&self) -> Result<BTreeMap<String, String>, NpsError> {
        let html = self
            .fetch_page(&format!("{}/index.htm", self.base_url))
            .await?;
        parse_state_index(&html, &self.base_url)
    }

    /// Fetches the ordered site URLs listed on a state page
    pub async fn fetch_state_sites(&self, state_url: &str) -> Result<Vec<String>, NpsError> {
        let html = self.fetch_page(state_url).await?;
        parse_state_sites(&html, &self.base_url)
    }

    /// Fetches and reads a single site page
    pub async fn fetch_site(&self, site_url: &str) -> Result<NationalSite, NpsError> {
        let html = self.fetch_page(site_url).await?;
        parse_site(&html)
    }
}

/// Compiles a selector known at compile time
fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

/// Trimmed text content of an element
fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Reads the state dropdown of the nps.gov home page
///
/// Link text is lowercased so lookups match "Michigan" and "michigan" alike.
pub fn parse_state_index(html: &str, base_url: &str) -> Result<BTreeMap<String, String>, NpsError> {
    let document = Html::parse_document(html);
    let menu = document
        .select(&selector(".dropdown-menu.SearchBar-keywordSearch"))
        .next()
        .ok_or_else(|| NpsError::MissingElement("state dropdown menu".to_string()))?;

    let mut states = BTreeMap::new();
    for link in menu.select(&selector("a[href]")) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let name = text_of(link).to_lowercase();
        if name.is_empty() {
            continue;
        }
        states.insert(name, format!("{}{}", base_url, href));
    }

    Ok(states)
}

/// Reads the site links from a state listing page
///
/// Only site-relative links are kept, in page order. A park linked more than
/// once on the page (its title and its "more" link) is listed once, at its
/// first position.
pub fn parse_state_sites(html: &str, base_url: &str) -> Result<Vec<String>, NpsError> {
    let document = Html::parse_document(html);
    let results = document
        .select(&selector("#parkListResultsArea"))
        .next()
        .ok_or_else(|| NpsError::MissingElement("park list results".to_string()))?;

    let mut seen = HashSet::new();
    let mut sites = Vec::new();
    for link in results.select(&selector("a[href]")) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.starts_with('/') {
            continue;
        }
        let url = format!("{}{}index.htm", base_url, href);
        if seen.insert(url.clone()) {
            sites.push(url);
        }
    }

    Ok(sites)
}

/// Reads the banner, mailing address and phone of a site page
pub fn parse_site(html: &str) -> Result<NationalSite, NpsError> {
    let document = Html::parse_document(html);

    let banner = document
        .select(&selector(".col-sm-12"))
        .next()
        .ok_or_else(|| NpsError::MissingElement("site banner".to_string()))?;
    let name = banner
        .select(&selector("a"))
        .next()
        .map(text_of)
        .ok_or_else(|| NpsError::MissingElement("site name".to_string()))?;
    let category = banner
        .select(&selector("span"))
        .next()
        .map(text_of)
        .unwrap_or_default();

    let address_block = document
        .select(&selector(".mailing-address"))
        .next()
        .ok_or_else(|| NpsError::MissingElement("mailing address".to_string()))?;
    let address_parts: Vec<String> = address_block.select(&selector("span")).map(text_of).collect();
    let [.., city, state, zip_code] = address_parts.as_slice() else {
        return Err(NpsError::MissingElement(
            "city, state and zip code in mailing address".to_string(),
        ));
    };

    let phone = document
        .select(&selector(".vcard"))
        .next()
        .ok_or_else(|| NpsError::MissingElement("contact card".to_string()))?
        .select(&selector("span"))
        .last()
        .map(text_of)
        .ok_or_else(|| NpsError::MissingElement("phone number".to_string()))?;

    Ok(NationalSite {
        category,
        name,
        address: format!("{}, {}", city, state),
        zip_code: zip_code.clone(),
        phone,
    })
}
