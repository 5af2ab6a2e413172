//! Application state shared across handlers.

use std::sync::Arc;

use tracing::info;
use url::Url;
use zenos_core::{AccessGuard, AdminPolicy};

use crate::config::StorefrontConfig;
use crate::countries::CountryDirectory;
use crate::feed::{FirestoreSource, ListingFeed, ListingSource, MemorySource, SourceError};
use crate::services::auth::{FirebaseAuthClient, IdentityProvider};

/// Error assembling application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid base_url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("base_url must have a host")]
    MissingHost,
    #[error("listing source: {0}")]
    Source(#[from] SourceError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    feed: ListingFeed,
    guard: AccessGuard,
    countries: CountryDirectory,
    identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Assemble state from explicit parts.
    ///
    /// The feed is not started here; call [`ListingFeed::start`] once the
    /// runtime is up.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL with a host.
    pub fn new(
        config: StorefrontConfig,
        feed: ListingFeed,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, StateError> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.host_str().is_none() {
            return Err(StateError::MissingHost);
        }

        let guard = AccessGuard::new(AdminPolicy::new(config.admin_email.clone()));
        let countries = CountryDirectory::new(config.countries_url.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                feed,
                guard,
                countries,
                identity,
            }),
        })
    }

    /// Assemble state from configuration: a local snapshot file when one is
    /// configured, Firestore otherwise, and Firebase Authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot file cannot be loaded or the base URL
    /// is invalid.
    pub async fn from_config(config: StorefrontConfig) -> Result<Self, StateError> {
        let source: Arc<dyn ListingSource> = match &config.feed.listings_file {
            Some(path) => {
                info!(path = %path.display(), "Serving listings from local file");
                Arc::new(MemorySource::from_file(path).await?)
            }
            None => Arc::new(FirestoreSource::new(
                &config.firebase,
                config.feed.poll_interval,
            )),
        };
        let identity = Arc::new(FirebaseAuthClient::new(&config.firebase));

        Self::new(config, ListingFeed::new(source), identity)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the live listing feed.
    #[must_use]
    pub fn feed(&self) -> &ListingFeed {
        &self.inner.feed
    }

    /// Get a reference to the dashboard access guard.
    #[must_use]
    pub fn guard(&self) -> &AccessGuard {
        &self.inner.guard
    }

    /// Get a reference to the country suggestion directory.
    #[must_use]
    pub fn countries(&self) -> &CountryDirectory {
        &self.inner.countries
    }

    /// Get a reference to the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }
}
