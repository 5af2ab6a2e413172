//! `filter`: run the storefront's listing filter over a snapshot file.

use std::io::Write;
use std::path::Path;

use zenos_core::filter_listings;
use zenos_storefront::feed::load_listings_file;

use super::CliError;

/// Load `file`, filter it, and write the matching listings as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the output written.
pub async fn run(
    out: &mut impl Write,
    file: &Path,
    query: &str,
    country: &str,
) -> Result<(), CliError> {
    let listings = load_listings_file(file).await?;
    let filtered = filter_listings(&listings, query, country);

    tracing::info!(
        total = listings.len(),
        matched = filtered.len(),
        "Filtered snapshot"
    );

    serde_json::to_writer_pretty(&mut *out, &filtered)?;
    writeln!(out)?;
    Ok(())
}
