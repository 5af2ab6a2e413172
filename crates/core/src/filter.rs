//! Search and country filtering over a listing snapshot.
//!
//! A listing passes when both hold:
//!
//! 1. the query is empty, or the title, country, or description contains it;
//! 2. the country filter is empty, or the country contains it.
//!
//! Both tests are case-sensitive substring matches. The output keeps the
//! order of the snapshot and is always a subset of it.

use serde::{Deserialize, Serialize};

use crate::listing::Listing;

/// The pair of inputs the feed filters by.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Free-text query matched against title, country, and description.
    #[serde(default)]
    pub query: String,
    /// Country substring.
    #[serde(default)]
    pub country: String,
}

impl ListingFilter {
    /// Create a filter from a query and a country substring.
    #[must_use]
    pub fn new(query: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            country: country.into(),
        }
    }

    /// True when neither the query nor the country filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.country.is_empty()
    }

    /// Whether a single listing passes the filter.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        let query_matches = self.query.is_empty() || listing.text_contains(&self.query);
        let country_matches = self.country.is_empty() || listing.country.contains(&self.country);
        query_matches && country_matches
    }

    /// Filter a snapshot, preserving its order.
    #[must_use]
    pub fn apply(&self, records: &[Listing]) -> Vec<Listing> {
        if self.is_empty() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|listing| self.matches(listing))
            .cloned()
            .collect()
    }
}

/// Re-derive the filtered view from a snapshot, a query, and a country filter.
#[must_use]
pub fn filter_listings(records: &[Listing], query: &str, country: &str) -> Vec<Listing> {
    ListingFilter::new(query, country).apply(records)
}
