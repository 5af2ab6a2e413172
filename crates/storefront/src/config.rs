//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ZENOS_BASE_URL` - Public URL for the storefront
//! - `ZENOS_ADMIN_EMAIL` - Address granted access to the admin dashboard
//! - `FIREBASE_PROJECT_ID` - Firebase project holding the listings collection
//! - `FIREBASE_API_KEY` - Firebase Web API key (Firestore REST + Auth)
//!
//! ## Optional
//! - `ZENOS_HOST` - Bind address (default: 127.0.0.1)
//! - `ZENOS_PORT` - Listen port (default: 3000)
//! - `ZENOS_LISTINGS_COLLECTION` - Firestore collection (default: cards)
//! - `ZENOS_POLL_INTERVAL_SECS` - Firestore refresh interval (default: 5)
//! - `ZENOS_SEARCH_DEBOUNCE_MS` - Live search quiet period (default: 500)
//! - `ZENOS_LISTINGS_FILE` - Serve a local JSON snapshot instead of Firestore
//! - `ZENOS_COUNTRIES_URL` - Country name source (default: restcountries.com)
//! - `ZENOS_LOG_FORMAT` - `json` for structured log lines (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use zenos_core::Email;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default quiet period before a typed query is applied.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default public country list.
pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all?fields=name";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// The single address treated as admin
    pub admin_email: Email,
    /// Firebase project and credentials
    pub firebase: FirebaseConfig,
    /// Listing feed tuning
    pub feed: FeedConfig,
    /// Where country suggestions are fetched from
    pub countries_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Firebase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Firebase project id
    pub project_id: String,
    /// Web API key used for Firestore REST reads and password sign-in
    pub api_key: SecretString,
    /// Firestore collection holding the listings
    pub collection: String,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("collection", &self.collection)
            .finish()
    }
}

/// Listing feed configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// How often Firestore is re-read for changes
    pub poll_interval: Duration,
    /// Quiet period before a typed query is applied
    pub search_debounce: Duration,
    /// Local JSON snapshot served instead of Firestore
    pub listings_file: Option<PathBuf>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            listings_file: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the Firebase API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("ZENOS_HOST", "127.0.0.1")?;
        let port = parse_env("ZENOS_PORT", "3000")?;
        let base_url = get_required_env("ZENOS_BASE_URL")?;
        let admin_email = Email::parse(&get_required_env("ZENOS_ADMIN_EMAIL")?).map_err(|e| {
            ConfigError::InvalidEnvVar("ZENOS_ADMIN_EMAIL".to_string(), e.to_string())
        })?;

        let firebase = FirebaseConfig::from_env()?;
        let feed = FeedConfig::from_env()?;
        let countries_url = get_env_or_default("ZENOS_COUNTRIES_URL", DEFAULT_COUNTRIES_URL);

        Ok(Self {
            host,
            port,
            base_url,
            admin_email,
            firebase,
            feed,
            countries_url,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl FirebaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project_id: get_required_env("FIREBASE_PROJECT_ID")?,
            api_key: get_validated_secret("FIREBASE_API_KEY")?,
            collection: get_env_or_default("ZENOS_LISTINGS_COLLECTION", "cards"),
        })
    }
}

impl FeedConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let poll_secs: u64 = parse_env("ZENOS_POLL_INTERVAL_SECS", "5")?;
        if poll_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ZENOS_POLL_INTERVAL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let debounce_ms: u64 = parse_env("ZENOS_SEARCH_DEBOUNCE_MS", "500")?;

        Ok(Self {
            poll_interval: Duration::from_secs(poll_secs),
            search_debounce: Duration::from_millis(debounce_ms),
            listings_file: get_optional_env("ZENOS_LISTINGS_FILE").map(PathBuf::from),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholders and low-entropy values.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn firebase() -> FirebaseConfig {
        FirebaseConfig {
            project_id: "zenos-motors".to_string(),
            api_key: SecretString::from("AIzaSyD3k9Qw7pLm2Xv8Rt5Yb1Nc4Hj6Gf0Ez"),
            collection: "cards".to_string(),
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength() {
        assert!(validate_secret_strength("your-api-key-here", "K").is_err());
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaa", "K").is_err());
        assert!(validate_secret_strength("AIzaSyD3k9Qw7pLm2Xv8Rt5Yb1Nc4Hj6Gf0Ez", "K").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            admin_email: Email::parse("admin@gmail.com").unwrap(),
            firebase: firebase(),
            feed: FeedConfig::default(),
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_https());
    }

    #[test]
    fn test_feed_defaults() {
        let feed = FeedConfig::default();
        assert_eq!(feed.search_debounce, Duration::from_millis(500));
        assert_eq!(feed.poll_interval, Duration::from_secs(5));
        assert!(feed.listings_file.is_none());
    }

    #[test]
    fn test_firebase_debug_redacts_key() {
        let debug_output = format!("{:?}", firebase());
        assert!(debug_output.contains("zenos-motors"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("AIzaSy"));
    }
}
