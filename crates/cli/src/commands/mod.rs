//! CLI command implementations.
//!
//! Commands write their results to the given writer (stdout in the binary)
//! and log progress through `tracing` on stderr.

pub mod access;
pub mod countries;
pub mod filter;
pub mod snapshot;

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Invalid email.
    #[error("Invalid email {0:?}: {1}")]
    InvalidEmail(String, zenos_core::EmailError),

    /// Storefront configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] zenos_storefront::config::ConfigError),

    /// Listing source error.
    #[error("Listing source error: {0}")]
    Source(#[from] zenos_storefront::feed::SourceError),

    /// Country directory error.
    #[error("Country directory error: {0}")]
    Countries(#[from] zenos_storefront::countries::CountryError),

    /// Output could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
