//! The listing record observed from the document store.

use serde::{Deserialize, Serialize};

use crate::types::{ListingId, Price};

/// One marketplace item.
///
/// Listings are created, updated, and deleted by the data store. The
/// storefront only ever holds read-only snapshots of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Listing {
    /// Document id assigned by the data store.
    #[serde(default)]
    pub id: ListingId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Price,
    /// Image URL. Older documents store this under `imgSrc`.
    #[serde(default, alias = "imgSrc")]
    pub image_url: String,
}

impl Listing {
    /// Whether any of the searchable text fields contains `needle`.
    ///
    /// Matching is a plain, case-sensitive substring test.
    #[must_use]
    pub fn text_contains(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.country.contains(needle)
            || self.description.contains(needle)
    }
}
