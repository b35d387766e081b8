//! Trending topics with a fixed fallback.
//!
//! Pulls current post titles from the forum's popular feed. If the upstream
//! is unavailable or the payload is malformed, a built-in topic list is
//! returned instead — this operation never errors.

use serde_json::Value;

use crate::config::AggregatorConfig;
use crate::error::SearchError;
use crate::http;
use crate::types::Source;

const POPULAR_URL: &str = "https://www.reddit.com/r/popular/hot.json";
const TRENDING_LIMIT: usize = 10;

/// Topics served when the upstream trending source is unavailable.
pub const FALLBACK_TOPICS: &[&str] = &[
    "technology",
    "world news",
    "science",
    "programming",
    "gaming",
    "music",
    "movies",
    "sports",
];

/// Fetch trending topic strings. Never errors: any failure falls back to
/// [`FALLBACK_TOPICS`].
pub async fn trending(config: &AggregatorConfig) -> Vec<String> {
    match try_fetch_trending(config).await {
        Ok(titles) if !titles.is_empty() => titles,
        Ok(_) => {
            tracing::warn!("trending feed was empty, using fallback topics");
            fallback()
        }
        Err(err) => {
            tracing::warn!(error = %err, "trending fetch failed, using fallback topics");
            fallback()
        }
    }
}

fn fallback() -> Vec<String> {
    FALLBACK_TOPICS.iter().map(|t| t.to_string()).collect()
}

async fn try_fetch_trending(config: &AggregatorConfig) -> Result<Vec<String>, SearchError> {
    let client = http::build_client(config, Source::Forum)?;
    let limit = TRENDING_LIMIT.to_string();

    let body = client
        .get(POPULAR_URL)
        .query(&[("limit", limit.as_str()), ("raw_json", "1")])
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("trending request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("trending HTTP error: {e}")))?
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("trending response read failed: {e}")))?;

    parse_trending_titles(&body)
}

/// Extract post titles from a popular-feed listing.
pub(crate) fn parse_trending_titles(body: &str) -> Result<Vec<String>, SearchError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("trending listing is not valid JSON: {e}")))?;

    let children = root
        .pointer("/data/children")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Parse("trending listing missing data.children".into()))?;

    Ok(children
        .iter()
        .filter_map(|child| child.pointer("/data/title"))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .filter(|title| !title.is_empty())
        .take(TRENDING_LIMIT)
        .collect())
}
