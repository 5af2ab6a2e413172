//! Per-viewer feed state.
//!
//! A [`FeedSession`] belongs to one live listing view (one WebSocket
//! connection). It owns a [`Subscription`] to the shared feed, the viewer's
//! search and country filters, and the debounce timer for typed queries.
//! Country changes apply immediately; query changes apply once typing has
//! been quiet for the debounce window.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use zenos_core::{Listing, ListingFilter};

use super::debounce::Debouncer;
use super::{FeedSnapshot, ListingFeed, Subscription};

/// What caused a session's view to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedChange {
    /// A new snapshot arrived from the feed.
    Snapshot,
    /// The debounced search query was applied.
    Query,
}

/// Render-ready state of a listing view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedView {
    /// Listings passing the active filters, in source order.
    pub listings: Vec<Listing>,
    /// Number of listings in the collection before filtering.
    pub total: usize,
    /// The applied (debounced) search query.
    pub query: String,
    pub country: String,
    pub error: Option<String>,
    /// Shown when a search matched nothing.
    pub no_results: Option<String>,
    pub loaded: bool,
}

impl FeedView {
    /// Build a view by filtering a full snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &FeedSnapshot, filter: &ListingFilter) -> Self {
        let listings = filter.apply(&snapshot.listings);
        Self::new(
            listings,
            snapshot.listings.len(),
            filter,
            snapshot.error.clone(),
            snapshot.loaded,
        )
    }

    fn new(
        listings: Vec<Listing>,
        total: usize,
        filter: &ListingFilter,
        error: Option<String>,
        loaded: bool,
    ) -> Self {
        let no_results = (listings.is_empty() && !filter.query.is_empty())
            .then(|| no_results_message(&filter.query));

        Self {
            listings,
            total,
            query: filter.query.clone(),
            country: filter.country.clone(),
            error,
            no_results,
            loaded,
        }
    }
}

/// Message shown when a search matched no listings.
#[must_use]
pub fn no_results_message(query: &str) -> String {
    format!("Sorry, we can't find cars that match \"{query}\".")
}

/// Live state for one listing view.
#[derive(Debug)]
pub struct FeedSession {
    subscription: Subscription,
    debouncer: Debouncer<String>,
    raw_query: String,
    filter: ListingFilter,
    listings: Arc<Vec<Listing>>,
    filtered: Vec<Listing>,
    error: Option<String>,
    loaded: bool,
    closed: bool,
}

impl FeedSession {
    /// Open a session on `feed`, seeded with its current snapshot.
    #[must_use]
    pub fn new(feed: &ListingFeed, debounce: Duration) -> Self {
        Self::with_filter(feed, debounce, ListingFilter::default())
    }

    /// Open a session with initial filters, applied without debouncing.
    #[must_use]
    pub fn with_filter(feed: &ListingFeed, debounce: Duration, filter: ListingFilter) -> Self {
        let subscription = feed.subscribe();
        let snapshot = subscription.current().unwrap_or_default();

        let mut session = Self {
            subscription,
            debouncer: Debouncer::new(debounce),
            raw_query: filter.query.clone(),
            filter,
            listings: Arc::new(Vec::new()),
            filtered: Vec::new(),
            error: None,
            loaded: false,
            closed: false,
        };
        session.apply_snapshot(&snapshot);
        session
    }

    /// Record a keystroke-level query edit. Applied after the quiet period.
    pub fn set_query(&mut self, query: impl Into<String>) {
        if self.closed {
            return;
        }
        let query = query.into();
        self.raw_query.clone_from(&query);
        self.debouncer.push(query);
    }

    /// Change the country filter. Applied immediately.
    pub fn set_country(&mut self, country: impl Into<String>) {
        if self.closed {
            return;
        }
        self.filter.country = country.into();
        self.refilter();
    }

    /// Replace the session's listings with `snapshot`.
    ///
    /// Returns `false` without changing anything once the session is closed.
    pub fn apply_snapshot(&mut self, snapshot: &FeedSnapshot) -> bool {
        if self.closed {
            return false;
        }
        self.listings = Arc::clone(&snapshot.listings);
        self.error.clone_from(&snapshot.error);
        self.loaded = snapshot.loaded;
        self.refilter();
        true
    }

    /// Wait for the next change to this session's view and apply it.
    ///
    /// Returns `None` once the session is closed or the feed has gone away.
    /// Cancel-safe.
    pub async fn next_change(&mut self) -> Option<FeedChange> {
        if self.closed {
            return None;
        }

        tokio::select! {
            snapshot = self.subscription.changed() => {
                if let Some(snapshot) = snapshot {
                    self.apply_snapshot(&snapshot);
                    Some(FeedChange::Snapshot)
                } else {
                    self.close();
                    None
                }
            }
            query = self.debouncer.settled() => {
                self.filter.query = query;
                self.refilter();
                Some(FeedChange::Query)
            }
        }
    }

    /// The current view.
    #[must_use]
    pub fn view(&self) -> FeedView {
        FeedView::new(
            self.filtered.clone(),
            self.listings.len(),
            &self.filter,
            self.error.clone(),
            self.loaded,
        )
    }

    /// The query as last typed, before debouncing.
    #[must_use]
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// The filters currently applied.
    #[must_use]
    pub const fn filter(&self) -> &ListingFilter {
        &self.filter
    }

    /// Tear the session down: unsubscribe and drop any pending query.
    /// Idempotent.
    pub fn close(&mut self) {
        self.subscription.unsubscribe();
        self.debouncer.cancel();
        self.closed = true;
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn refilter(&mut self) {
        self.filtered = self.filter.apply(&self.listings);
    }
}

impl Drop for FeedSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use zenos_core::{ListingId, Price};

    use super::*;
    use crate::feed::{FEED_ERROR_MESSAGE, MemorySource};

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn listing(id: &str, title: &str, country: &str) -> Listing {
        Listing {
            id: ListingId::new(id),
            title: title.to_string(),
            country: country.to_string(),
            description: format!("{title} for sale"),
            price: Price::parse("10000").unwrap(),
            image_url: String::new(),
        }
    }

    fn inventory() -> Vec<Listing> {
        vec![
            listing("1", "Civic", "Japan"),
            listing("2", "Golf", "Germany"),
            listing("3", "Corolla", "Japan"),
        ]
    }

    async fn feed_over(source: &MemorySource) -> ListingFeed {
        let feed = ListingFeed::new(Arc::new(source.clone()));
        feed.start();
        feed.wait_ready().await;
        feed
    }

    fn ids(view: &FeedView) -> Vec<&str> {
        view.listings.iter().map(|l| l.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_new_session_shows_current_snapshot() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;

        let session = FeedSession::new(&feed, DEBOUNCE);
        let view = session.view();

        assert_eq!(ids(&view), vec!["1", "2", "3"]);
        assert_eq!(view.total, 3);
        assert!(view.loaded);
        assert!(view.no_results.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_applies_after_quiet_period() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;
        let mut session = FeedSession::new(&feed, DEBOUNCE);

        session.set_query("C");
        session.set_query("Ci");
        session.set_query("Civ");
        assert_eq!(session.raw_query(), "Civ");
        assert_eq!(session.view().listings.len(), 3, "not applied yet");

        let change = session.next_change().await;
        assert_eq!(change, Some(FeedChange::Query));

        let view = session.view();
        assert_eq!(view.query, "Civ");
        assert_eq!(ids(&view), vec!["1"]);
    }

    #[tokio::test]
    async fn test_country_applies_immediately() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;
        let mut session = FeedSession::new(&feed, DEBOUNCE);

        session.set_country("Japan");

        assert_eq!(ids(&session.view()), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_new_snapshot_is_refiltered() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;
        let mut session = FeedSession::new(&feed, DEBOUNCE);
        session.set_country("Germany");

        let mut updated = inventory();
        updated.push(listing("4", "Passat", "Germany"));
        source.push(updated);

        assert_eq!(session.next_change().await, Some(FeedChange::Snapshot));
        let view = session.view();
        assert_eq!(ids(&view), vec!["2", "4"]);
        assert_eq!(view.total, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_results_message() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;
        let mut session = FeedSession::new(&feed, DEBOUNCE);

        session.set_query("Tesla");
        session.next_change().await;

        let view = session.view();
        assert!(view.listings.is_empty());
        assert_eq!(
            view.no_results.as_deref(),
            Some("Sorry, we can't find cars that match \"Tesla\".")
        );
    }

    #[tokio::test]
    async fn test_error_snapshot_surfaces_message() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;
        let mut session = FeedSession::new(&feed, DEBOUNCE);

        source.fail("unavailable");
        session.next_change().await;

        let view = session.view();
        assert_eq!(view.error.as_deref(), Some(FEED_ERROR_MESSAGE));
        assert_eq!(view.listings.len(), 3);
    }

    #[tokio::test]
    async fn test_closed_session_ignores_late_snapshots() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;
        let mut session = FeedSession::new(&feed, DEBOUNCE);
        let before = session.view();
        assert!(!session.is_closed());

        session.close();
        session.close();
        assert!(session.is_closed());
        source.push(vec![listing("9", "Beetle", "Germany")]);

        assert_eq!(session.next_change().await, None);
        assert!(!session.apply_snapshot(&feed.snapshot()));
        assert_eq!(session.view(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_drops_pending_query() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;
        let mut session = FeedSession::new(&feed, DEBOUNCE);

        session.set_query("Golf");
        session.close();
        tokio::time::advance(DEBOUNCE * 2).await;

        assert_eq!(session.next_change().await, None);
        assert_eq!(session.view().query, "");
    }

    #[tokio::test]
    async fn test_dropping_session_releases_subscription() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;
        let before = feed.subscriber_count();

        let session = FeedSession::new(&feed, DEBOUNCE);
        assert_eq!(feed.subscriber_count(), before + 1);
        drop(session);
        assert_eq!(feed.subscriber_count(), before);
    }

    #[tokio::test]
    async fn test_with_filter_applies_immediately() {
        let source = MemorySource::new(inventory());
        let feed = feed_over(&source).await;

        let session =
            FeedSession::with_filter(&feed, DEBOUNCE, ListingFilter::new("Corolla", "Japan"));

        assert_eq!(ids(&session.view()), vec!["3"]);
    }

    #[test]
    fn test_view_from_snapshot() {
        let snapshot = FeedSnapshot {
            listings: Arc::new(inventory()),
            error: None,
            loaded: true,
            version: 1,
        };
        let view = FeedView::from_snapshot(&snapshot, &ListingFilter::new("", "Japan"));
        assert_eq!(ids(&view), vec!["1", "3"]);
        assert!(view.no_results.is_none(), "no message without a query");
    }
}
