//! Firestore REST adapter for the listing collection.
//!
//! Reads go through the `documents` list endpoint, following `nextPageToken`
//! until the collection is exhausted. The live subscription re-reads the
//! collection on a fixed interval and yields a snapshot only when the
//! contents changed since the last successful delivery.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};
use zenos_core::{Listing, ListingId, Price};

use super::source::{ListingSource, SnapshotStream, SourceError};
use crate::config::FirebaseConfig;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

/// Firestore-backed listing source.
#[derive(Clone)]
pub struct FirestoreSource {
    inner: Arc<FirestoreSourceInner>,
}

struct FirestoreSourceInner {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    poll_interval: Duration,
}

impl FirestoreSource {
    /// Create a source for the configured project and collection.
    #[must_use]
    pub fn new(config: &FirebaseConfig, poll_interval: Duration) -> Self {
        let endpoint = format!(
            "{FIRESTORE_BASE_URL}/projects/{}/databases/(default)/documents/{}",
            config.project_id, config.collection
        );

        Self {
            inner: Arc::new(FirestoreSourceInner {
                client: reqwest::Client::new(),
                endpoint,
                api_key: config.api_key.clone(),
                poll_interval,
            }),
        }
    }

    /// Fetch one page of documents.
    async fn fetch_page(&self, page_token: Option<&str>) -> Result<ListPage, SourceError> {
        let page_size = PAGE_SIZE.to_string();
        let mut params = vec![
            ("pageSize", page_size.as_str()),
            ("key", self.inner.api_key.expose_secret()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .inner
            .client
            .get(&self.inner.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(SourceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ListingSource for FirestoreSource {
    fn name(&self) -> &'static str {
        "firestore"
    }

    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    async fn fetch_all(&self) -> Result<Vec<Listing>, SourceError> {
        let mut listings = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(page_token.as_deref()).await?;
            listings.extend(decode_documents(page.documents));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = listings.len(), "Fetched listings from Firestore");
        Ok(listings)
    }

    fn watch(&self) -> SnapshotStream {
        let source = self.clone();

        Box::pin(async_stream::stream! {
            let mut ticker = tokio::time::interval(source.inner.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<Vec<Listing>> = None;

            loop {
                ticker.tick().await;
                match source.fetch_all().await {
                    Ok(listings) => {
                        if last.as_ref() != Some(&listings) {
                            last = Some(listings.clone());
                            yield Ok(listings);
                        }
                    }
                    Err(e) => {
                        // Force the next good read through so the error clears.
                        last = None;
                        yield Err(e);
                    }
                }
            }
        })
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

/// A Firestore typed value. Only the scalar kinds listings use are decoded.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Value {
    string_value: Option<String>,
    integer_value: Option<String>,
    double_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a page of documents.
fn decode_documents(documents: Vec<Document>) -> Vec<Listing> {
    documents.into_iter().map(decode_document).collect()
}

fn decode_document(doc: Document) -> Listing {
    let text = |key: &str| {
        doc.fields
            .get(key)
            .and_then(|v| v.string_value.clone())
            .unwrap_or_default()
    };

    // An unreadable price never hides the listing.
    let price = match doc.fields.get("price").map(decode_price) {
        None => Price::ZERO,
        Some(Ok(price)) => price,
        Some(Err(reason)) => {
            warn!(document = %doc.name, %reason, "Unreadable price, showing listing at zero");
            Price::ZERO
        }
    };

    let image_url = match doc.fields.get("imgSrc") {
        Some(_) => text("imgSrc"),
        None => text("image_url"),
    };

    Listing {
        id: ListingId::from_resource_name(&doc.name),
        title: text("title"),
        country: text("country"),
        description: text("description"),
        price,
        image_url,
    }
}

fn decode_price(value: &Value) -> Result<Price, String> {
    if let Some(integer) = &value.integer_value {
        return Price::parse(integer).map_err(|e| e.to_string());
    }
    if let Some(double) = value.double_value {
        return Price::from_f64(double).map_err(|e| e.to_string());
    }
    if let Some(text) = &value.string_value {
        return Price::parse(text).map_err(|e| e.to_string());
    }
    Ok(Price::ZERO)
}
