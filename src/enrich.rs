//! Community/channel enricher.
//!
//! A secondary, lightweight fetch that returns groupings (forum communities
//! and video channels) related to the query. Runs only for first-page
//! requests; failures degrade to an empty list and never propagate. Results
//! are cached per query session so a reset to page 1 does not refetch them.

use std::sync::OnceLock;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

use crate::config::AggregatorConfig;
use crate::error::SearchError;
use crate::http;
use crate::sources::normalize::{absolutize, unescape_entities};
use crate::sources::video;
use crate::types::{Grouping, Source};

const COMMUNITY_SEARCH_URL: &str = "https://www.reddit.com/subreddits/search.json";
const COMMUNITY_HOST: &str = "https://www.reddit.com";

/// Maximum number of cached grouping sets.
const MAX_CACHE_ENTRIES: u64 = 100;

/// Per-query-session grouping cache. TTL is fixed on first initialisation.
static GROUPING_CACHE: OnceLock<Cache<String, Vec<Grouping>>> = OnceLock::new();

fn grouping_cache(ttl_secs: u64) -> &'static Cache<String, Vec<Grouping>> {
    GROUPING_CACHE.get_or_init(|| {
        Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build()
    })
}

/// Fetch up to `config.grouping_limit` groupings related to the query.
///
/// Forum communities and video channels are fetched concurrently; either
/// half failing just shrinks the list. Never returns an error.
pub async fn enrich(query: &str, config: &AggregatorConfig) -> Vec<Grouping> {
    let key = query.trim().to_lowercase();
    let cache = grouping_cache(config.grouping_cache_ttl_secs);
    if let Some(cached) = cache.get(&key).await {
        tracing::trace!(query = %key, "grouping cache hit");
        return cached;
    }

    let (communities, channels) = tokio::join!(
        fetch_forum_communities(query, config),
        fetch_video_channels(query, config),
    );

    let mut groupings = communities;
    groupings.extend(channels);
    groupings.truncate(config.grouping_limit);

    store_groupings(cache, key, &groupings).await;
    groupings
}

/// Cache a grouping set for its query session. Empty sets are not stored:
/// they usually mean both fetches failed, and caching them would pin the
/// failure for the full TTL after the upstreams recover.
async fn store_groupings(cache: &Cache<String, Vec<Grouping>>, key: String, groupings: &[Grouping]) {
    if groupings.is_empty() {
        return;
    }
    cache.insert(key, groupings.to_vec()).await;
}

/// Search forum communities matching the query. Failures yield an empty list.
pub(crate) async fn fetch_forum_communities(
    query: &str,
    config: &AggregatorConfig,
) -> Vec<Grouping> {
    match try_fetch_forum_communities(query, config).await {
        Ok(communities) => communities,
        Err(err) => {
            tracing::warn!(error = %err, "community fetch failed");
            Vec::new()
        }
    }
}

async fn try_fetch_forum_communities(
    query: &str,
    config: &AggregatorConfig,
) -> Result<Vec<Grouping>, SearchError> {
    let client = http::build_client(config, Source::Forum)?;
    let limit = config.grouping_limit.to_string();

    let body = client
        .get(COMMUNITY_SEARCH_URL)
        .query(&[("q", query), ("limit", limit.as_str()), ("raw_json", "1")])
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("community request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("community HTTP error: {e}")))?
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("community response read failed: {e}")))?;

    parse_community_listing(&body, config.grouping_limit)
}

/// Parse a community-search listing into groupings.
pub(crate) fn parse_community_listing(
    body: &str,
    limit: usize,
) -> Result<Vec<Grouping>, SearchError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("community listing is not valid JSON: {e}")))?;

    let children = root
        .pointer("/data/children")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Parse("community listing missing data.children".into()))?;

    Ok(children
        .iter()
        .filter_map(|child| child.get("data"))
        .filter_map(normalize_community)
        .take(limit)
        .collect())
}

fn normalize_community(data: &Value) -> Option<Grouping> {
    let name = data.get("display_name").and_then(Value::as_str)?.to_string();
    let canonical_url = match data.get("url").and_then(Value::as_str) {
        Some(path) if !path.is_empty() => format!("{COMMUNITY_HOST}{path}"),
        _ => return None,
    };

    let icon_url = data
        .get("community_icon")
        .and_then(Value::as_str)
        .filter(|icon| !icon.is_empty())
        .or_else(|| {
            data.get("icon_img")
                .and_then(Value::as_str)
                .filter(|icon| !icon.is_empty())
        })
        .map(unescape_entities)
        .as_deref()
        .and_then(absolutize);

    Some(Grouping {
        name,
        subscriber_count: data.get("subscribers").and_then(Value::as_u64),
        icon_url,
        canonical_url,
    })
}

/// Fetch video channels related to the query from the results-page data.
/// Failures yield an empty list.
pub(crate) async fn fetch_video_channels(query: &str, config: &AggregatorConfig) -> Vec<Grouping> {
    match try_fetch_video_channels(query, config).await {
        Ok(channels) => channels,
        Err(err) => {
            tracing::warn!(error = %err, "channel fetch failed");
            Vec::new()
        }
    }
}

async fn try_fetch_video_channels(
    query: &str,
    config: &AggregatorConfig,
) -> Result<Vec<Grouping>, SearchError> {
    let client = http::build_client(config, Source::Video)?;
    let html = client
        .get("https://www.youtube.com/results")
        .query(&[("search_query", query), ("hl", "en")])
        .header("Accept", "text/html,application/xhtml+xml")
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("channel request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("channel HTTP error: {e}")))?
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("channel response read failed: {e}")))?;

    let data = video::extract_initial_data(&html)?;
    Ok(video::collect_channels(&data, config.grouping_limit))
}
