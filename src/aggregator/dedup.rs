//! Item deduplication by a stable identity key.
//!
//! The identity of an item is its normalised target URL plus its trimmed,
//! lowercased title. The first occurrence of a key wins and the input order
//! is preserved, so running deduplication twice is a no-op. Items carrying
//! neither a title nor a URL have no identity and are dropped.

use std::collections::HashSet;

use url::Url;

use crate::types::Item;

/// Tracking query parameters that are stripped during URL normalisation,
/// so shares of the same page from different upstreams compare equal.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "si",
    "feature",
];

/// Deduplicate a merged item sequence, keeping first-seen order.
pub fn deduplicate(items: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    items
        .into_iter()
        .filter(|item| match identity_key(item) {
            Some(key) => seen.insert(key),
            None => false,
        })
        .collect()
}

/// The deduplication identity of an item, or `None` when it has neither a
/// title nor a target URL.
fn identity_key(item: &Item) -> Option<(String, String)> {
    let url = normalize_url(item.target_url.trim());
    let title = item.title.trim().to_lowercase();
    if url.is_empty() && title.is_empty() {
        return None;
    }
    Some((url, title))
}

/// Canonicalise a URL for identity comparison: drop the fragment and
/// default ports, strip tracking parameters, sort the remaining query
/// pairs, and trim a trailing slash. Unparseable input is compared as-is.
pub(crate) fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);

    if matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        parsed.set_query(Some(&query));
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    parsed.to_string()
}
