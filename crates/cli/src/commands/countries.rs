//! `countries`: print the country suggestion list.

use std::io::Write;

use zenos_storefront::countries::CountryDirectory;

use super::CliError;

/// Fetch the list from `url` and write one name per line.
///
/// Unlike the storefront, a failed fetch is reported rather than shown as an
/// empty list.
///
/// # Errors
///
/// Returns an error if the directory cannot be reached or the output written.
pub async fn run(out: &mut impl Write, url: &str) -> Result<(), CliError> {
    let names = CountryDirectory::new(url).fetch().await?;
    tracing::info!(count = names.len(), "Fetched countries");

    for name in &names {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
