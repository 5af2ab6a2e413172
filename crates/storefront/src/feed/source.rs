//! Data source abstraction for the listing collection.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use zenos_core::Listing;

/// Errors reported by a listing source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the store.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Snapshot file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The live transport failed.
    #[error("transport error: {0}")]
    Transport(String),
}

/// A live stream of full collection snapshots.
///
/// Each `Ok` item is the complete current contents of the collection, not a
/// delta. An `Err` item reports a failed delivery; the stream keeps going and
/// later items may succeed again.
pub type SnapshotStream = BoxStream<'static, Result<Vec<Listing>, SourceError>>;

/// A collection of listings held by an external store.
#[async_trait]
pub trait ListingSource: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// One-time batch read of the whole collection.
    async fn fetch_all(&self) -> Result<Vec<Listing>, SourceError>;

    /// Open a live subscription. Dropping the stream closes it.
    fn watch(&self) -> SnapshotStream;
}
