//! Core types for aggregated feed items, groupings, and page results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single normalized result record from any upstream source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// The item title (may be empty for link-only posts).
    pub title: String,
    /// Short preview derived from `full_text` — first N words, truncated.
    /// Never independently supplied.
    pub short_description: String,
    /// Raw body text. Empty string if the source has none.
    pub full_text: String,
    /// Canonical link for the item. May be empty.
    pub target_url: String,
    /// Post author or video channel name.
    pub author_or_channel: String,
    /// Creation time, normalized to UTC. `None` when the source field is
    /// missing or unparseable — never defaulted to "now".
    pub created_at: Option<DateTime<Utc>>,
    /// Absolute, scheme-qualified thumbnail URL if one could be resolved.
    pub thumbnail_url: Option<String>,
    /// Source-specific engagement count (post score or view count). 0 if unknown.
    pub engagement: u64,
    /// Which upstream source produced this item.
    pub source: Source,
    /// Composite relevance score in `[0, 1]`, filled in by the scorer.
    /// Not part of the item's identity.
    pub ranking_score: f64,
}

/// Upstream sources that multifeed can aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Discussion-forum search API (JSON listing with a native continuation token).
    Forum,
    /// Video-platform results page (no native continuation; offsets are emulated).
    Video,
}

impl Source {
    /// Returns the human-readable name of this source.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Forum => "forum",
            Self::Video => "video",
        }
    }

    /// Returns all available source variants.
    pub fn all() -> &'static [Source] {
        &[Self::Forum, Self::Video]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lightweight community/channel grouping related to a query.
///
/// Created fresh per request (the per-query-session cache aside), never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grouping {
    /// Community or channel name.
    pub name: String,
    /// Subscriber/follower count if the upstream reports one.
    pub subscriber_count: Option<u64>,
    /// Absolute icon URL if one could be resolved.
    pub icon_url: Option<String>,
    /// Canonical link to the community or channel.
    pub canonical_url: String,
}

/// One page of ranked results plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// The query this page answers.
    pub query: String,
    /// 1-based page number (after clamping).
    pub page: usize,
    /// Requested page size.
    pub page_size: usize,
    /// Total items in the ranked pool.
    pub total_results: usize,
    /// Total pages. Always at least 1, even for an empty pool.
    pub total_pages: usize,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
    /// The items on this page, ordered by descending `ranking_score`.
    pub items: Vec<Item>,
    /// Upstream continuation token, passed through verbatim in
    /// upstream-paginated mode. Absent in locally-paginated mode.
    pub continuation: Option<String>,
}

/// How the caller wants results paged.
#[derive(Debug, Clone)]
pub enum PageRequest {
    /// Locally-paginated mode: collect a bounded pool across all sources,
    /// rank it once, and slice the requested page.
    Page {
        /// 1-based page number. Out-of-range values are clamped, never errors.
        page: usize,
        /// Items per page. Must be greater than zero.
        page_size: usize,
    },
    /// Upstream-paginated mode: relay the forum source's native continuation
    /// token. Each call returns one small, fixed-size batch.
    Continuation {
        /// Token from the previous response, or `None` for the first page.
        token: Option<String>,
        /// Batch size requested from the upstream.
        limit: usize,
    },
}

impl PageRequest {
    /// Whether this request is for the first page of a query session.
    /// First-page requests additionally trigger the broaden fetch and the
    /// grouping enricher.
    pub fn is_first_page(&self) -> bool {
        match self {
            Self::Page { page, .. } => *page <= 1,
            Self::Continuation { token, .. } => token.is_none(),
        }
    }
}

/// A [`PageResult`] plus the groupings attached on first-page requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The ranked, paginated items.
    #[serde(flatten)]
    pub page: PageResult,
    /// Related communities/channels. Populated only on first-page requests;
    /// empty on later pages.
    pub groupings: Vec<Grouping>,
}

/// Response shape for the video-only operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoPage {
    /// The requested page of ranked video items.
    pub videos: Vec<Item>,
    /// Related channels. Populated only for the first page.
    pub channels: Vec<Grouping>,
}
