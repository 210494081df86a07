//! `gwcal cache list`: show what the geocode cache holds.

use std::path::Path;

use anyhow::Context;
use gwcal_scraper::{CacheEntry, GeocodeCache};

/// Prints one `query<TAB>lat,lon` line per cache entry. Entries without a
/// candidate print `-`; unreadable ones print `corrupt`.
///
/// # Errors
///
/// Returns an error if the cache directory cannot be read.
pub(crate) async fn run_cache_list(dir: &Path) -> anyhow::Result<()> {
    let cache = GeocodeCache::new(dir);
    let entries = cache
        .entries()
        .await
        .with_context(|| format!("failed to read geocode cache at {}", dir.display()))?;

    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    tracing::info!(entries = entries.len(), dir = %dir.display(), "listed geocode cache");
    Ok(())
}

fn format_entry(entry: &CacheEntry) -> String {
    let detail = match (&entry.body, entry.coordinates()) {
        (None, _) => "corrupt".to_string(),
        (Some(_), Some(c)) => format!("{},{}", c.lat, c.lon),
        (Some(_), None) => "-".to_string(),
    };
    format!("{}\t{detail}", entry.query)
}
