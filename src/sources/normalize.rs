//! Shared field normalization for source adapters.
//!
//! Upstream payloads disagree about everything: timestamps arrive as epoch
//! floats or compact date strings, thumbnails hide in three different
//! places, view counts come as `"1,234,567 views"`. The helpers here turn
//! those into the common [`crate::types::Item`] field shapes. Any value
//! that cannot be made sense of becomes `None` or zero — never a guess.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use url::Url;

/// File extensions treated as direct image links.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// A single strategy for pulling a thumbnail candidate out of a raw record.
/// First strategy in a chain to produce a URL wins.
pub(crate) type UrlExtractor = fn(&Value) -> Option<String>;

/// Resolve a thumbnail URL from a raw record via a prioritized extractor
/// chain. The first extractor to yield a candidate wins; the candidate is
/// then made absolute and scheme-qualified, or discarded if that fails.
pub(crate) fn resolve_thumbnail(raw: &Value, chain: &[UrlExtractor]) -> Option<String> {
    chain.iter().find_map(|extract| extract(raw)).and_then(|u| absolutize(&u))
}

/// Resolve a possibly protocol-relative or bare-host URL to an absolute
/// `https://` URL. Returns `None` for host-less relative paths and anything
/// that still fails to parse.
pub(crate) fn absolutize(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let candidate = if let Some(rest) = raw.strip_prefix("//") {
        format!("https://{rest}")
    } else if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else if !raw.starts_with('/') && raw.split('/').next().is_some_and(|host| host.contains('.')) {
        // Bare host like "i.example.com/a.png".
        format!("https://{raw}")
    } else {
        return None;
    };
    Url::parse(&candidate).ok().map(String::from)
}

/// Whether a URL points directly at an image file, judged by path extension.
pub(crate) fn looks_like_image_url(url: &str) -> bool {
    let path = url.split(&['?', '#'][..]).next().unwrap_or(url).to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Keep the first `limit` whitespace-split words of `text`, rejoined with
/// single spaces, with an ellipsis appended when the result is non-empty.
/// Non-reversible by design — the full text stays on the item.
pub(crate) fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().take(limit).collect();
    if words.is_empty() {
        String::new()
    } else {
        format!("{}…", words.join(" "))
    }
}

/// Normalize an upstream timestamp field into a UTC instant.
///
/// Accepts epoch seconds (numeric, or a numeric string) and compact
/// `YYYYMMDD` date strings. Any parse failure yields `None`; an earlier
/// revision substituted the current time here, which silently ranked broken
/// records as maximally recent.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(secs) = value.as_f64() {
        return Utc.timestamp_opt(secs as i64, 0).single();
    }
    let text = value.as_str()?.trim();
    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = text[0..4].parse().ok()?;
        let month: u32 = text[4..6].parse().ok()?;
        let day: u32 = text[6..8].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    let secs: f64 = text.parse().ok()?;
    Utc.timestamp_opt(secs as i64, 0).single()
}

/// Parse an exact count out of text like `"1,234,567 views"`. Returns 0 for
/// anything without leading digits (`"No views"`).
pub(crate) fn parse_count(text: &str) -> u64 {
    let token = text.split_whitespace().next().unwrap_or("");
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Parse an approximate count out of compact text like `"1.2M subscribers"`.
pub(crate) fn parse_compact_count(text: &str) -> Option<u64> {
    let token = text.split_whitespace().next()?;
    let (number, multiplier) = match token.chars().last()? {
        'K' | 'k' => (&token[..token.len() - 1], 1_000.0),
        'M' | 'm' => (&token[..token.len() - 1], 1_000_000.0),
        'B' | 'b' => (&token[..token.len() - 1], 1_000_000_000.0),
        _ => (token, 1.0),
    };
    let value: f64 = number.replace(',', "").parse().ok()?;
    if value < 0.0 {
        return None;
    }
    Some((value * multiplier) as u64)
}

/// Undo the HTML-entity escaping some upstreams apply inside JSON strings.
pub(crate) fn unescape_entities(text: &str) -> String {
    text.replace("&amp;", "&")
}
