//! `snapshot`: one-time batch read of the listing collection.
//!
//! Uses the storefront configuration (`FIREBASE_*`, `ZENOS_*`). The output is
//! the JSON array format `ZENOS_LISTINGS_FILE` and `filter --file` accept.

use std::io::Write;
use std::path::Path;

use zenos_core::Listing;
use zenos_storefront::config::StorefrontConfig;
use zenos_storefront::feed::{FirestoreSource, ListingSource};

use super::CliError;

async fn fetch() -> Result<Vec<Listing>, CliError> {
    let config = StorefrontConfig::from_env()?;
    let source = FirestoreSource::new(&config.firebase, config.feed.poll_interval);

    tracing::info!(collection = %config.firebase.collection, "Reading listing collection");
    let listings = source.fetch_all().await?;
    tracing::info!(count = listings.len(), "Read listings");
    Ok(listings)
}

/// Write the collection to `out` as JSON.
///
/// # Errors
///
/// Returns an error if configuration is missing, the read fails, or the output
/// cannot be written.
pub async fn run(out: &mut impl Write) -> Result<(), CliError> {
    let listings = fetch().await?;
    serde_json::to_writer_pretty(&mut *out, &listings)?;
    writeln!(out)?;
    Ok(())
}

/// Write the collection to a file.
///
/// # Errors
///
/// Returns an error if configuration is missing, the read fails, or the file
/// cannot be written.
pub async fn to_file(path: &Path) -> Result<(), CliError> {
    let listings = fetch().await?;
    let json = serde_json::to_vec_pretty(&listings)?;
    tokio::fs::write(path, json).await?;
    tracing::info!(path = %path.display(), "Wrote snapshot");
    Ok(())
}
