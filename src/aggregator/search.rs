//! Aggregation orchestrator: concurrent multi-source fan-out, merge, dedup,
//! score, sort, paginate.
//!
//! All source tasks for one request are dispatched together and joined
//! before any merging happens (join-then-merge, no shared mutable state, no
//! sibling cancellation). Each individual fetch carries a hard per-source
//! timeout, so one slow upstream cannot stall the request past a bounded
//! ceiling. A failed source contributes an empty sequence; the request only
//! fails when every required source failed.

use std::cmp::Ordering;
use std::time::Duration;

use crate::config::AggregatorConfig;
use crate::enrich;
use crate::error::SearchError;
use crate::source::{FetchPage, SourceAdapter};
use crate::sources::{ForumAdapter, VideoAdapter};
use crate::types::{Grouping, Item, PageRequest, PageResult, SearchResponse, Source};

use super::dedup::deduplicate;
use super::paginate::paginate;
use super::scoring::RelevanceScorer;

/// Orchestrate one aggregated page.
///
/// # Pipeline
///
/// 1. Dispatch all source tasks concurrently (plus, on the first page only,
///    the broaden fetch and the grouping enricher)
/// 2. Join everything; log per-source failures at warn level
/// 3. Merge contributions in dispatch order and deduplicate by identity key
/// 4. Score with the composite relevance scorer and stably sort descending
/// 5. Slice locally, or relay the upstream continuation token verbatim
///
/// # Errors
///
/// Returns [`SearchError::AllSourcesFailed`] only if **every** required
/// source failed. Partial failures degrade to a smaller result pool.
pub async fn aggregate(
    query: &str,
    request: &PageRequest,
    config: &AggregatorConfig,
) -> Result<SearchResponse, SearchError> {
    match request {
        PageRequest::Page { page, page_size } => {
            local_page(query, *page, *page_size, config).await
        }
        PageRequest::Continuation { token, limit } => {
            continuation_page(query, token.as_deref(), *limit, config).await
        }
    }
}

/// Locally-paginated mode: collect a bounded pool from every source, rank
/// the whole pool once, and slice the requested page. Ordering is stable
/// across pages — no item appears on two pages, and page N never depends on
/// later fetches.
async fn local_page(
    query: &str,
    page: usize,
    page_size: usize,
    config: &AggregatorConfig,
) -> Result<SearchResponse, SearchError> {
    let first_page = page <= 1;

    let pool_futures: Vec<_> = Source::all()
        .iter()
        .map(|&source| async move { (source, collect_pool(source, query, config).await) })
        .collect();

    let (outcomes, extra, groupings) = tokio::join!(
        futures::future::join_all(pool_futures),
        first_page_broaden(first_page, query, config),
        first_page_groupings(first_page, query, config),
    );

    let mut pool: Vec<Item> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    for (source, outcome) in outcomes {
        match outcome {
            Ok(items) => {
                tracing::debug!(%source, count = items.len(), "source pool collected");
                pool.extend(items);
            }
            Err(err) => {
                tracing::warn!(%source, error = %err, "source fetch failed");
                errors.push(format!("{source}: {err}"));
            }
        }
    }
    if errors.len() == Source::all().len() {
        return Err(SearchError::AllSourcesFailed(errors.join("; ")));
    }
    pool.extend(extra);

    let items = rank(pool, query, config);
    let page_result = paginate(items, page, page_size, query);

    Ok(SearchResponse {
        page: page_result,
        groupings,
    })
}

/// Upstream-paginated mode: one fixed-size forum batch per call, with the
/// forum's native continuation token relayed verbatim.
async fn continuation_page(
    query: &str,
    token: Option<&str>,
    limit: usize,
    config: &AggregatorConfig,
) -> Result<SearchResponse, SearchError> {
    let first_page = token.is_none();

    let (fetched, extra, groupings) = tokio::join!(
        fetch_one(Source::Forum, query, token, limit, config),
        first_page_broaden(first_page, query, config),
        first_page_groupings(first_page, query, config),
    );

    // The forum is the only source in play here, so its failure is total.
    let batch = fetched.map_err(|err| {
        SearchError::AllSourcesFailed(format!("{}: {err}", Source::Forum))
    })?;

    Ok(finish_continuation(
        batch, extra, groupings, query, limit, first_page, config,
    ))
}

/// Assemble the continuation-mode response from a fetched batch and the
/// first-page extras. The upstream cursor knows nothing about broaden items,
/// so the merged first page is capped at `limit` to keep the batch size the
/// caller asked for.
fn finish_continuation(
    batch: FetchPage,
    extra: Vec<Item>,
    groupings: Vec<Grouping>,
    query: &str,
    limit: usize,
    first_page: bool,
    config: &AggregatorConfig,
) -> SearchResponse {
    let next = batch.next_continuation;

    let mut pool = batch.items;
    pool.extend(extra);
    let mut items = rank(pool, query, config);
    items.truncate(limit);

    let total_results = items.len();
    SearchResponse {
        page: PageResult {
            query: query.to_string(),
            page: 1,
            page_size: limit,
            total_results,
            total_pages: 1,
            has_next: next.is_some(),
            has_prev: !first_page,
            items,
            continuation: next,
        },
        groupings,
    }
}

/// Dedup, score, and stably sort a merged pool.
fn rank(pool: Vec<Item>, query: &str, config: &AggregatorConfig) -> Vec<Item> {
    let mut items = deduplicate(pool);
    let scorer = RelevanceScorer::new(config);
    scorer.score_all(&mut items, query);
    // sort_by is stable: equal scores keep their first-seen order.
    items.sort_by(|a, b| {
        b.ranking_score
            .partial_cmp(&a.ranking_score)
            .unwrap_or(Ordering::Equal)
    });
    items
}

/// Collect a source's pool by following its (native or emulated)
/// continuation token until exhaustion or the configured bound.
///
/// The loop is sequential by necessity — each call needs the previous
/// call's token — but runs concurrently with the other sources' loops.
pub(crate) async fn collect_pool(
    source: Source,
    query: &str,
    config: &AggregatorConfig,
) -> Result<Vec<Item>, SearchError> {
    let mut items: Vec<Item> = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let fetched =
            fetch_one(source, query, token.as_deref(), config.per_fetch_limit, config).await;
        let batch = match fetched {
            Ok(batch) => batch,
            // Nothing collected yet: the source failed outright.
            Err(err) if items.is_empty() => return Err(err),
            // Keep the partial pool rather than discarding a degraded source.
            Err(err) => {
                tracing::warn!(%source, error = %err, "pool collection stopped early");
                break;
            }
        };
        let batch_len = batch.items.len();
        items.extend(batch.items);
        match batch.next_continuation {
            Some(next) if items.len() < config.pool_limit && batch_len > 0 => {
                token = Some(next);
            }
            _ => break,
        }
    }

    items.truncate(config.pool_limit);
    Ok(items)
}

/// One timed fetch, dispatched to the concrete adapter.
async fn fetch_one(
    source: Source,
    query: &str,
    token: Option<&str>,
    limit: usize,
    config: &AggregatorConfig,
) -> Result<FetchPage, SearchError> {
    let secs = config.source_timeout_secs(source);
    let fetch = async {
        match source {
            Source::Forum => ForumAdapter::default().fetch(query, token, limit, config).await,
            Source::Video => VideoAdapter.fetch(query, token, limit, config).await,
        }
    };
    match tokio::time::timeout(Duration::from_secs(secs), fetch).await {
        Ok(result) => result,
        Err(_) => Err(SearchError::Timeout(format!(
            "{source} fetch exceeded {secs}s"
        ))),
    }
}

/// First-page-only broaden fetch: one forum batch under the secondary sort
/// order, widening the candidate pool. Optional — failures contribute
/// nothing and are only logged.
async fn first_page_broaden(
    first_page: bool,
    query: &str,
    config: &AggregatorConfig,
) -> Vec<Item> {
    if !first_page {
        return Vec::new();
    }
    let secs = config.source_timeout_secs(Source::Forum);
    // The fetch future borrows the adapter, which must outlive the await.
    let adapter = ForumAdapter::top();
    let fetch = adapter.fetch(query, None, config.per_fetch_limit, config);
    match tokio::time::timeout(Duration::from_secs(secs), fetch).await {
        Ok(Ok(batch)) => {
            tracing::debug!(count = batch.items.len(), "broaden fetch collected");
            batch.items
        }
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "broaden fetch failed");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!("broaden fetch timed out");
            Vec::new()
        }
    }
}

/// First-page-only grouping fetch. Failures degrade to no groupings.
async fn first_page_groupings(
    first_page: bool,
    query: &str,
    config: &AggregatorConfig,
) -> Vec<Grouping> {
    if first_page {
        enrich::enrich(query, config).await
    } else {
        Vec::new()
    }
}
