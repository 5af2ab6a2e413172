//! In-memory listing source.
//!
//! Serves a snapshot held in a `watch` channel. Used for local development
//! (loaded from `ZENOS_LISTINGS_FILE`) and by tests, which drive it with
//! [`MemorySource::push`] and [`MemorySource::fail`].

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use zenos_core::{Listing, ListingId};

use super::source::{ListingSource, SnapshotStream, SourceError};

type MemoryState = Result<Vec<Listing>, String>;

/// A listing source backed by memory.
#[derive(Clone)]
pub struct MemorySource {
    tx: Arc<watch::Sender<MemoryState>>,
}

impl MemorySource {
    /// Create a source holding `listings`.
    #[must_use]
    pub fn new(listings: Vec<Listing>) -> Self {
        let (tx, _rx) = watch::channel(Ok(listings));
        Self { tx: Arc::new(tx) }
    }

    /// Create a source from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn from_file(path: &Path) -> Result<Self, SourceError> {
        Ok(Self::new(load_listings_file(path).await?))
    }

    /// Replace the collection contents; subscribers receive the new snapshot.
    pub fn push(&self, listings: Vec<Listing>) {
        self.tx.send_replace(Ok(listings));
    }

    /// Report a transport failure to subscribers.
    pub fn fail(&self, message: impl Into<String>) {
        self.tx.send_replace(Err(message.into()));
    }

    /// Number of open subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl ListingSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_all(&self) -> Result<Vec<Listing>, SourceError> {
        self.tx.borrow().clone().map_err(SourceError::Transport)
    }

    fn watch(&self) -> SnapshotStream {
        WatchStream::new(self.tx.subscribe())
            .map(|state| state.map_err(SourceError::Transport))
            .boxed()
    }
}

/// Read a JSON array of listings from disk.
///
/// Records without an id get `listing-<n>` by position so every record in a
/// snapshot stays addressable.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of
/// listings.
pub async fn load_listings_file(path: &Path) -> Result<Vec<Listing>, SourceError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_listings(&content)
}

fn parse_listings(content: &str) -> Result<Vec<Listing>, SourceError> {
    let mut listings: Vec<Listing> = serde_json::from_str(content)?;
    for (n, listing) in listings.iter_mut().enumerate() {
        if listing.id.as_str().is_empty() {
            listing.id = ListingId::new(format!("listing-{}", n + 1));
        }
    }
    Ok(listings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn civic() -> Listing {
        Listing {
            id: ListingId::new("1"),
            title: "Civic".to_string(),
            country: "Japan".to_string(),
            ..Listing::default()
        }
    }

    #[tokio::test]
    async fn test_watch_yields_current_then_updates() {
        let source = MemorySource::new(vec![civic()]);
        let mut stream = source.watch();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, vec![civic()]);

        source.push(Vec::new());
        let second = stream.next().await.unwrap().unwrap();
        assert!(second.is_empty());

        source.fail("offline");
        let third = stream.next().await.unwrap();
        assert!(matches!(third, Err(SourceError::Transport(m)) if m == "offline"));
    }

    #[tokio::test]
    async fn test_fetch_all_reflects_latest_push() {
        let source = MemorySource::new(Vec::new());
        source.push(vec![civic()]);
        assert_eq!(source.fetch_all().await.unwrap(), vec![civic()]);
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_subscriber() {
        let source = MemorySource::new(Vec::new());
        let stream = source.watch();
        assert_eq!(source.subscriber_count(), 1);
        drop(stream);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_parse_listings_assigns_missing_ids() {
        let listings = parse_listings(
            r#"[{"title": "Civic", "price": 10000}, {"id": "golf", "title": "Golf"}]"#,
        )
        .unwrap();
        assert_eq!(listings[0].id.as_str(), "listing-1");
        assert_eq!(listings[1].id.as_str(), "golf");
    }

    #[test]
    fn test_parse_listings_rejects_non_array() {
        assert!(matches!(
            parse_listings(r#"{"title": "Civic"}"#),
            Err(SourceError::Parse(_))
        ));
    }
}
