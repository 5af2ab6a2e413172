//! Country name suggestions for the listing filter.
//!
//! Names come from a public country directory (restcountries by default) and
//! are cached for a day. A failed fetch is logged and yields an empty list so
//! the filter input keeps working without suggestions.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

const CACHE_KEY: &str = "all";
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors fetching the country list.
#[derive(Debug, Error)]
pub enum CountryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Country directory returned {0}")]
    Status(u16),
}

/// Cached client for the country directory.
#[derive(Clone)]
pub struct CountryDirectory {
    inner: Arc<CountryDirectoryInner>,
}

struct CountryDirectoryInner {
    client: reqwest::Client,
    url: String,
    cache: Cache<&'static str, Arc<Vec<String>>>,
}

impl CountryDirectory {
    /// Create a directory client for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            inner: Arc::new(CountryDirectoryInner {
                client,
                url: url.into(),
                cache: Cache::builder()
                    .max_capacity(1)
                    .time_to_live(CACHE_TTL)
                    .build(),
            }),
        }
    }

    /// Sorted common country names, or an empty list if the directory is
    /// unreachable.
    pub async fn names(&self) -> Arc<Vec<String>> {
        if let Some(names) = self.inner.cache.get(CACHE_KEY).await {
            return names;
        }

        match self.fetch().await {
            Ok(names) => {
                let names = Arc::new(names);
                self.inner
                    .cache
                    .insert(CACHE_KEY, Arc::clone(&names))
                    .await;
                names
            }
            Err(e) => {
                warn!(error = %e, url = %self.inner.url, "Error fetching countries");
                Arc::new(Vec::new())
            }
        }
    }

    /// Fetch the list, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the directory answers with a
    /// non-success status.
    #[instrument(skip(self), fields(url = %self.inner.url))]
    pub async fn fetch(&self) -> Result<Vec<String>, CountryError> {
        let response = self.inner.client.get(&self.inner.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CountryError::Status(status.as_u16()));
        }

        let entries: Vec<CountryEntry> = response.json().await?;
        let names = sorted_names(entries);
        debug!(count = names.len(), "Fetched country names");
        Ok(names)
    }
}

#[derive(Debug, Deserialize)]
struct CountryEntry {
    name: CountryName,
}

#[derive(Debug, Deserialize)]
struct CountryName {
    common: String,
}

fn sorted_names(entries: Vec<CountryEntry>) -> Vec<String> {
    let mut names: Vec<String> = entries
        .into_iter()
        .map(|entry| entry.name.common)
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}
