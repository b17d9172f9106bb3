use crate::api::RatesSource;
use crate::models::CurrencyCatalogEntry;
use tracing::warn;

/// Fetches the currency catalog. Any failure is logged and yields an empty
/// list so the landing view can still be shown.
pub async fn list_currencies(source: &dyn RatesSource) -> Vec<CurrencyCatalogEntry> {
    match source.fetch_catalog().await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("could not load currency catalog: {}", e);
            Vec::new()
        }
    }
}

/// Entries whose code or shown name contains `query`, ignoring case.
/// A blank query matches everything.
pub fn search<'a>(
    entries: &'a [CurrencyCatalogEntry],
    query: &str,
) -> Vec<&'a CurrencyCatalogEntry> {
    let needle = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.key.to_lowercase().contains(&needle)
                || entry.label().to_lowercase().contains(&needle)
        })
        .collect()
}
