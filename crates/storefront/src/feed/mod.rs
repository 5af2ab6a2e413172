//! Live listing feed.
//!
//! The storefront keeps one subscription to the listing collection open for
//! the life of the process. A background task pumps the source's snapshot
//! stream into a `watch` channel; pages read the latest snapshot and live
//! sessions subscribe to it.
//!
//! ```text
//! ListingSource::watch() --pump--> watch<FeedSnapshot> --+--> page handlers (snapshot)
//!                                                        +--> FeedSession (Subscription)
//! ```
//!
//! A failed delivery keeps the last good listings and sets a user-visible
//! error. The next successful snapshot clears it.

mod debounce;
mod firestore;
mod memory;
mod session;
pub mod source;

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use zenos_core::Listing;

pub use debounce::Debouncer;
pub use firestore::FirestoreSource;
pub use memory::{MemorySource, load_listings_file};
pub use session::{FeedChange, FeedSession, FeedView};
pub use source::{ListingSource, SnapshotStream, SourceError};

/// Message shown to shoppers while the subscription is failing.
pub const FEED_ERROR_MESSAGE: &str = "Failed to fetch cards. Please try again later.";

/// The latest state of the listing collection.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    /// Full contents of the collection, in source order.
    pub listings: Arc<Vec<Listing>>,
    /// User-visible error from the most recent failed delivery.
    pub error: Option<String>,
    /// Whether at least one snapshot has been received.
    pub loaded: bool,
    /// Bumped on every delivery, successful or not.
    pub version: u64,
}

impl FeedSnapshot {
    fn apply(&mut self, delivery: Result<Vec<Listing>, SourceError>) {
        self.version += 1;
        match delivery {
            Ok(listings) => {
                self.listings = Arc::new(listings);
                self.error = None;
                self.loaded = true;
            }
            Err(e) => {
                error!(error = %e, "Error fetching listings");
                self.error = Some(FEED_ERROR_MESSAGE.to_string());
            }
        }
    }
}

/// Process-wide handle to the live listing feed.
///
/// Cheaply cloneable; all clones share one subscription to the source.
#[derive(Clone)]
pub struct ListingFeed {
    inner: Arc<ListingFeedInner>,
}

struct ListingFeedInner {
    source: Arc<dyn ListingSource>,
    tx: watch::Sender<FeedSnapshot>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl ListingFeed {
    /// Create a feed over `source`. Nothing is read until [`start`](Self::start).
    #[must_use]
    pub fn new(source: Arc<dyn ListingSource>) -> Self {
        let (tx, _rx) = watch::channel(FeedSnapshot::default());
        Self {
            inner: Arc::new(ListingFeedInner {
                source,
                tx,
                pump: Mutex::new(None),
            }),
        }
    }

    /// Open the subscription in a background task.
    ///
    /// Calling this while the pump is already running has no effect.
    pub fn start(&self) {
        let Ok(mut pump) = self.inner.pump.lock() else {
            error!("Listing feed pump lock poisoned");
            return;
        };
        if pump.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let source = Arc::clone(&self.inner.source);
        let feed = self.clone();
        info!(source = source.name(), "Starting listing subscription");

        *pump = Some(tokio::spawn(async move {
            let mut stream = source.watch();
            while let Some(delivery) = stream.next().await {
                feed.inner.tx.send_modify(|snapshot| snapshot.apply(delivery));
            }
            warn!(source = source.name(), "Listing subscription ended");
        }));
    }

    /// Close the subscription. Subscribers keep the last snapshot.
    pub fn stop(&self) {
        if let Ok(mut pump) = self.inner.pump.lock()
            && let Some(handle) = pump.take()
        {
            handle.abort();
            info!("Listing subscription closed");
        }
    }

    /// The latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.inner.tx.borrow().clone()
    }

    /// Whether the first snapshot has arrived.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.tx.borrow().loaded
    }

    /// Wait until the first snapshot has arrived.
    pub async fn wait_ready(&self) {
        let mut rx = self.inner.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|snapshot| snapshot.loaded).await;
    }

    /// Open a listener on the feed.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: Some(self.inner.tx.subscribe()),
        }
    }

    /// Number of open listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.tx.receiver_count()
    }

    /// The underlying source, for one-time batch reads.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn ListingSource> {
        &self.inner.source
    }
}

/// One listener on the feed.
///
/// Dropping the subscription, or calling [`unsubscribe`](Self::unsubscribe),
/// releases it. An unsubscribed listener never observes another snapshot.
#[derive(Debug)]
pub struct Subscription {
    rx: Option<watch::Receiver<FeedSnapshot>>,
}

impl Subscription {
    /// The snapshot current at this moment, or `None` once unsubscribed.
    #[must_use]
    pub fn current(&self) -> Option<FeedSnapshot> {
        self.rx.as_ref().map(|rx| rx.borrow().clone())
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once unsubscribed or when the feed is gone. Cancel-safe.
    pub async fn changed(&mut self) -> Option<FeedSnapshot> {
        let rx = self.rx.as_mut()?;
        if rx.changed().await.is_err() {
            self.rx = None;
            return None;
        }
        Some(rx.borrow_and_update().clone())
    }

    /// Stop listening. Idempotent.
    pub fn unsubscribe(&mut self) {
        self.rx = None;
    }

    /// Whether the subscription is still open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.rx.is_some()
    }
}
