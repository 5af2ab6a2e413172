//! Integration test harness for Zenos.
//!
//! Builds the real storefront router over an in-memory listing source and a
//! stub identity provider, so tests need no network access beyond loopback.
//!
//! ```rust,ignore
//! let app = TestApp::new().await;
//! let base = app.spawn().await;
//! let client = TestApp::client();
//! let resp = client.get(format!("{base}/health")).send().await.unwrap();
//! assert_eq!(resp.status(), 200);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use secrecy::SecretString;
use zenos_core::{Email, Identity, Listing, ListingId, Price};
use zenos_storefront::AppState;
use zenos_storefront::config::{FeedConfig, FirebaseConfig, StorefrontConfig};
use zenos_storefront::feed::{ListingFeed, MemorySource};
use zenos_storefront::services::auth::{AuthError, IdentityProvider};

/// The configured admin address.
pub const ADMIN_EMAIL: &str = "admin@gmail.com";
/// Password for both stub accounts.
pub const PASSWORD: &str = "correct-horse";
/// A signed-up shopper without admin rights.
pub const SHOPPER_EMAIL: &str = "shopper@gmail.com";

/// Debounce window used by test configs.
pub const TEST_DEBOUNCE: Duration = Duration::from_millis(50);

/// Identity provider with a fixed set of accounts.
pub struct StubIdentityProvider {
    accounts: HashMap<String, Identity>,
}

impl StubIdentityProvider {
    /// Accounts for the admin (registered as `Admin@Gmail.com`) and a shopper.
    #[must_use]
    pub fn new() -> Self {
        let mut accounts = HashMap::new();
        for (uid, address) in [("uid-admin", "Admin@Gmail.com"), ("uid-shopper", SHOPPER_EMAIL)] {
            let email = Email::parse(address).expect("valid address");
            accounts.insert(email.normalized(), Identity::new(uid, Some(email)));
        }
        Self { accounts }
    }
}

impl Default for StubIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Identity, AuthError> {
        match self.accounts.get(&email.normalized()) {
            Some(identity) if password == PASSWORD => Ok(identity.clone()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

/// Storefront configuration pointing nowhere external.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().expect("valid ip"),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        admin_email: Email::parse(ADMIN_EMAIL).expect("valid address"),
        firebase: FirebaseConfig {
            project_id: "zenos-test".to_string(),
            api_key: SecretString::from("AIzaSyD3k9Qw7pLm2Xv8Rt5Yb1Nc4Hj6Gf0Ez"),
            collection: "cards".to_string(),
        },
        feed: FeedConfig {
            search_debounce: TEST_DEBOUNCE,
            ..FeedConfig::default()
        },
        // Port 9 (discard) refuses connections, so suggestions degrade to empty.
        countries_url: "http://127.0.0.1:9/all".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Build a listing.
#[must_use]
pub fn listing(id: &str, title: &str, country: &str, description: &str, price: &str) -> Listing {
    Listing {
        id: ListingId::new(id),
        title: title.to_string(),
        country: country.to_string(),
        description: description.to_string(),
        price: Price::parse(price).expect("valid price"),
        image_url: format!("https://img.example/{id}.png"),
    }
}

/// A small inventory across three countries.
#[must_use]
pub fn sample_listings() -> Vec<Listing> {
    vec![
        listing("civic", "Civic", "Japan", "sedan", "10000"),
        listing("golf", "Golf", "Germany", "hatchback", "8999.50"),
        listing("corolla", "Corolla", "Japan", "reliable sedan", "12500"),
        listing("mustang", "Mustang", "United States", "coupe", "27000"),
    ]
}

/// A storefront wired to an in-memory source.
pub struct TestApp {
    /// Drives the listing collection.
    pub source: MemorySource,
    pub state: AppState,
}

impl TestApp {
    /// Start a storefront over [`sample_listings`] and wait for the first
    /// snapshot.
    pub async fn new() -> Self {
        Self::with_listings(sample_listings()).await
    }

    /// Start a storefront over `listings`.
    pub async fn with_listings(listings: Vec<Listing>) -> Self {
        Self::with_config(listings, test_config()).await
    }

    /// Start a storefront over `listings` with a custom configuration.
    pub async fn with_config(listings: Vec<Listing>, config: StorefrontConfig) -> Self {
        let source = MemorySource::new(listings);
        let state = Self::state_over(&source, config);
        state.feed().start();
        state.feed().wait_ready().await;
        Self { source, state }
    }

    /// A storefront whose feed has not been started.
    #[must_use]
    pub fn unstarted() -> Self {
        let source = MemorySource::new(Vec::new());
        let state = Self::state_over(&source, test_config());
        Self { source, state }
    }

    fn state_over(source: &MemorySource, config: StorefrontConfig) -> AppState {
        let feed = ListingFeed::new(Arc::new(source.clone()));
        AppState::new(config, feed, Arc::new(StubIdentityProvider::new()))
            .expect("valid test state")
    }

    /// The full application router.
    #[must_use]
    pub fn router(&self) -> Router {
        zenos_storefront::app(self.state.clone())
    }

    /// Serve the router on an ephemeral loopback port; returns the base URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr: SocketAddr = listener.local_addr().expect("local addr");
        let router = self.router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}")
    }

    /// HTTP client that keeps cookies and does not follow redirects.
    #[must_use]
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Sign in through `POST /login`.
    pub async fn sign_in(client: &reqwest::Client, base: &str, email: &str) -> reqwest::Response {
        client
            .post(format!("{base}/login"))
            .form(&[("email", email), ("password", PASSWORD)])
            .send()
            .await
            .expect("login request")
    }
}
