//! Trait definition for pluggable upstream source adapters.
//!
//! Each upstream (forum search API, video results page) implements
//! [`SourceAdapter`] to provide a uniform fetch-one-batch interface for
//! the aggregator.

use crate::config::AggregatorConfig;
use crate::error::SearchError;
use crate::types::{Item, Source};

/// One batch of normalized items from a source, plus the token (native or
/// emulated) for fetching the next batch.
#[derive(Debug, Clone, Default)]
pub struct FetchPage {
    /// Items in upstream order, already normalized into the common shape.
    pub items: Vec<Item>,
    /// Continuation token for the next batch. `None` when the source is
    /// exhausted.
    pub next_continuation: Option<String>,
}

/// A pluggable upstream source adapter.
///
/// Implementors fetch one batch of raw records from their upstream and
/// normalize them into [`Item`] values. Each adapter handles its own URL
/// construction, request headers, payload parsing, and field normalization.
///
/// Transport errors, non-success statuses, and malformed payloads surface
/// as `Err` from [`fetch`](SourceAdapter::fetch); the aggregator absorbs
/// them into an empty contribution rather than failing the whole request.
///
/// All implementations must be `Send + Sync` for concurrent dispatch.
pub trait SourceAdapter: Send + Sync {
    /// Fetch and normalize one batch of items.
    ///
    /// # Arguments
    ///
    /// * `query` — The search query (URL encoding is the adapter's job).
    /// * `continuation` — Token from the previous batch, or `None` to start.
    /// * `limit` — How many items to request from the upstream.
    /// * `config` — Timeouts, User-Agent, and normalization tuning.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the HTTP request fails or the payload
    /// cannot be parsed at all. Individual malformed records are dropped or
    /// have the offending field blanked, never failing the batch.
    fn fetch(
        &self,
        query: &str,
        continuation: Option<&str>,
        limit: usize,
        config: &AggregatorConfig,
    ) -> impl std::future::Future<Output = Result<FetchPage, SearchError>> + Send;

    /// Which [`Source`] this adapter fetches from.
    fn source(&self) -> Source;

    /// Whether this adapter's continuation token is a native upstream cursor
    /// that can be relayed verbatim to the caller. Emulated offset tokens
    /// return `false` — they only drive internal pool collection.
    fn supports_continuation(&self) -> bool {
        false
    }
}
