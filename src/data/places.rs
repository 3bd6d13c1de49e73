//! MapQuest place search client
//!
//! Looks up places around a postal code with the MapQuest radius search API.
//! The response is returned as raw JSON so it can be cached verbatim.

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Radius search endpoint
const PLACES_BASE_URL: &str = "http://www.mapquestapi.com/search/v2/radius";

/// Search radius around the origin, in miles
pub const SEARCH_RADIUS: u32 = 10;

/// Maximum number of places returned per search
pub const MAX_MATCHES: u32 = 10;

/// Errors that can occur when fetching nearby places
#[derive(Debug, Error)]
pub enum PlacesError {
    /// HTTP request failed, returned an error status or was not JSON
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The request URL could not be built
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for the MapQuest radius search API
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    /// Endpoint URL (allows override for testing)
    base_url: String,
}

impl PlacesClient {
    /// Create a new PlacesClient with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, PLACES_BASE_URL)
    }

    /// Create a new PlacesClient with a custom endpoint
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Builds the search URL for places around `zip_code`
    pub fn search_url(&self, zip_code: &str) -> Result<Url, PlacesError> {
        let radius = SEARCH_RADIUS.to_string();
        let max_matches = MAX_MATCHES.to_string();
        let url = Url::parse_with_params(
            &self.base_url,
            &[
                ("key", self.api_key.as_str()),
                ("origin", zip_code),
                ("maxMatches", max_matches.as_str()),
                ("radius", radius.as_str()),
                ("ambiguities", "ignore"),
                ("outFormat", "json"),
            ],
        )?;
        Ok(url)
    }

    /// Fetches the raw search response for places around `zip_code`
    pub async fn fetch_nearby(&self, zip_code: &str) -> Result<Value, PlacesError> {
        let url = self.search_url(zip_code)?;
        tracing::debug!(zip_code, "searching nearby places");

        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_contains_fixed_parameters() {
        let client = PlacesClient::new("secret");

        let url = client.search_url("49931").unwrap();
        let query = url.query().unwrap_or_default();

        assert!(url.as_str().starts_with(PLACES_BASE_URL));
        assert!(query.contains("key=secret"));
        assert!(query.contains("origin=49931"));
        assert!(query.contains("maxMatches=10"));
        assert!(query.contains("radius=10"));
        assert!(query.contains("ambiguities=ignore"));
        assert!(query.contains("outFormat=json"));
    }

    #[test]
    fn test_search_url_encodes_zip_plus_four() {
        let client = PlacesClient::new("secret");

        let url = client.search_url("82190-0168").unwrap();

        let origin = url
            .query_pairs()
            .find(|(k, _)| k == "origin")
            .map(|(_, v)| v.into_owned());
        assert_eq!(origin.as_deref(), Some("82190-0168"));
    }

    #[test]
    fn test_search_url_with_bad_base_fails() {
        let client = PlacesClient::with_base_url("secret", "not a url");

        assert!(matches!(
            client.search_url("49931"),
            Err(PlacesError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_nearby_unreachable_host_fails() {
        let client = PlacesClient::with_base_url("secret", "http://127.0.0.1:9/search");

        let result = client.fetch_nearby("49931").await;

        assert!(matches!(result, Err(PlacesError::RequestFailed(_))));
    }
}
