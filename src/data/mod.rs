//! Core data models for the national site browser
//!
//! This module contains the records fetched from nps.gov and the places API,
//! along with the clients that fetch them.

pub mod nps;
pub mod places;

pub use nps::{NpsClient, NpsError};
pub use places::{PlacesClient, PlacesError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A national site as described on its nps.gov page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalSite {
    /// Designation such as "National Park"; some sites have none
    pub category: String,
    /// Name of the site, e.g. "Isle Royale"
    pub name: String,
    /// City and state, e.g. "Houghton, MI"
    pub address: String,
    /// Postal code, e.g. "49931" or "82190-0168"
    pub zip_code: String,
    /// Contact phone number
    pub phone: String,
}

impl NationalSite {
    /// One-line description used in site listings
    pub fn info(&self) -> String {
        format!(
            "{} ({}): {} {}",
            self.name, self.category, self.address, self.zip_code
        )
    }
}

/// A single entry of a places API search result
///
/// The API omits fields freely, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Place {
    /// Business or landmark name
    pub name: Option<String>,
    /// Category label
    #[serde(rename = "group_sic_code_name")]
    pub category: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
}

/// Typed view of the places in a raw places API response
///
/// The response itself is cached verbatim; this only reads `searchResults`.
/// A missing or malformed `searchResults` yields no places, and entries that
/// are not objects are skipped.
pub fn places_in(response: &Value) -> Vec<Place> {
    response
        .get("searchResults")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|entry| Place::deserialize(entry).ok())
                .collect()
        })
        .unwrap_or_default()
}
