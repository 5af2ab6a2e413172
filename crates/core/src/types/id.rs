//! Listing identifiers.
//!
//! Ids are assigned by the document store; the storefront never mints them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a listing document.
///
/// Wraps the document id exactly as the data store reports it, so two
/// snapshots of the same document compare equal by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    /// Create a new listing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying document id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the id from a full document resource name.
    ///
    /// `projects/p/databases/(default)/documents/cards/abc123` becomes `abc123`.
    #[must_use]
    pub fn from_resource_name(name: &str) -> Self {
        Self(name.rsplit('/').next().unwrap_or(name).to_owned())
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ListingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_resource_name() {
        let id = ListingId::from_resource_name(
            "projects/zenos/databases/(default)/documents/cards/abc123",
        );
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_from_bare_id() {
        assert_eq!(ListingId::from_resource_name("abc123").as_str(), "abc123");
    }

    #[test]
    fn test_display() {
        assert_eq!(ListingId::new("x1").to_string(), "x1");
    }
}
