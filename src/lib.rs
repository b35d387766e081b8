//! # multifeed
//!
//! Embedded multi-source topic feed aggregation.
//!
//! This crate searches several heterogeneous upstreams about a topic — a
//! discussion-forum JSON API and a video-platform results page — and merges
//! them into a single relevance-ranked, paginated feed, with lightweight
//! community/channel groupings on the side. It compiles into a host binary
//! as a library dependency; exposing it over a network endpoint is the
//! host's business.
//!
//! ## Design
//!
//! - Queries all sources concurrently with a hard per-source timeout and
//!   joins before merging — one slow or broken upstream never stalls or
//!   fails the whole request
//! - Normalizes every upstream record into a common [`Item`] shape, then
//!   deduplicates by a stable identity key (normalised URL + title)
//! - Ranks with a composite score: log-damped engagement, asymptotic
//!   recency, and query/title match, each bounded to `[0, 1]`
//! - Paginates locally over a bounded pool for stable cross-page ordering,
//!   or relays the forum's native continuation token verbatim
//! - Groupings are fetched only for first-page requests and cached per
//!   query session
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners — this is a library, not a server
//! - Queries are logged only at trace level
//! - All entities are request-scoped; nothing is persisted

pub mod aggregator;
pub mod config;
pub mod enrich;
pub mod error;
pub mod http;
pub mod source;
pub mod sources;
pub mod trending;
pub mod types;

pub use config::{AggregatorConfig, ScoringWeights};
pub use error::{Result, SearchError};
pub use source::{FetchPage, SourceAdapter};
pub use types::{Grouping, Item, PageRequest, PageResult, SearchResponse, Source, VideoPage};

/// Search all sources and return one ranked page plus groupings.
///
/// Dispatches every configured source concurrently, merges and deduplicates
/// their items, scores and sorts the pool, and slices the requested page.
/// First-page requests additionally run the broaden fetch and the grouping
/// enricher; later pages skip both.
///
/// # Errors
///
/// - [`SearchError::EmptyQuery`] if `query` is empty after trimming. No
///   upstream call is made in that case.
/// - [`SearchError::AllSourcesFailed`] if every required source failed —
///   distinct from a successful response with zero items.
/// - [`SearchError::Config`] if `config` is invalid.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> multifeed::Result<()> {
/// let config = multifeed::AggregatorConfig::default();
/// let request = multifeed::PageRequest::Page { page: 1, page_size: 15 };
/// let response = multifeed::search("rust programming", &request, &config).await?;
/// for item in &response.page.items {
///     println!("{:.3} {} [{}]", item.ranking_score, item.title, item.source);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    query: &str,
    request: &PageRequest,
    config: &AggregatorConfig,
) -> Result<SearchResponse> {
    config.validate()?;
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    aggregator::search::aggregate(query, request, config).await
}

/// Search with default configuration and first-page defaults.
///
/// Convenience wrapper around [`search`] using [`AggregatorConfig::default()`].
///
/// # Errors
///
/// Same as [`search`].
pub async fn search_default(query: &str) -> Result<SearchResponse> {
    let config = AggregatorConfig::default();
    let request = PageRequest::Page {
        page: 1,
        page_size: config.page_size,
    };
    search(query, &request, &config).await
}

/// Search the video source only, returning one ranked page of videos plus
/// related channels.
///
/// Channels are fetched only for the first page, mirroring the grouping
/// rule of [`search`]; their fetch failures degrade to an empty list.
///
/// # Errors
///
/// - [`SearchError::EmptyQuery`] if `query` is empty after trimming.
/// - [`SearchError::AllSourcesFailed`] if the video source failed.
/// - [`SearchError::Config`] if `config` is invalid.
pub async fn videos(query: &str, page: usize, config: &AggregatorConfig) -> Result<VideoPage> {
    config.validate()?;
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let (pool, channels) = tokio::join!(
        aggregator::search::collect_pool(Source::Video, query, config),
        async {
            if page <= 1 {
                enrich::fetch_video_channels(query, config).await
            } else {
                Vec::new()
            }
        },
    );

    let pool =
        pool.map_err(|err| SearchError::AllSourcesFailed(format!("{}: {err}", Source::Video)))?;

    let mut items = aggregator::dedup::deduplicate(pool);
    let scorer = aggregator::scoring::RelevanceScorer::new(config);
    scorer.score_all(&mut items, query);
    items.sort_by(|a, b| {
        b.ranking_score
            .partial_cmp(&a.ranking_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let page_result = aggregator::paginate::paginate(items, page, config.page_size, query);
    Ok(VideoPage {
        videos: page_result.items,
        channels,
    })
}

/// Fetch trending topic strings.
///
/// Falls back to a fixed built-in list when the upstream is unavailable;
/// never errors.
pub async fn trending_topics(config: &AggregatorConfig) -> Vec<String> {
    trending::trending(config).await
}
