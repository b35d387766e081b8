//! Aggregator configuration with sensible defaults.
//!
//! [`AggregatorConfig`] carries everything that used to be ambient tuning
//! constants: per-source timeouts, page sizes, pool bounds, scoring weights,
//! and grouping limits. It is fixed at startup and passed by reference into
//! every operation — there is no mutable global state.

use crate::error::SearchError;
use crate::types::Source;

/// Relative weights for the three relevance sub-scores.
///
/// Each sub-score lies in `[0, 1]` before weighting, so weights that sum to
/// 1.0 keep the composite score in `[0, 1]`. Validation enforces the sum.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    /// Weight of the log-damped engagement sub-score.
    pub engagement: f64,
    /// Weight of the recency sub-score.
    pub recency: f64,
    /// Weight of the query/title match sub-score.
    pub title_match: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            engagement: 0.4,
            recency: 0.3,
            title_match: 0.3,
        }
    }
}

impl ScoringWeights {
    /// Sum of all three weights. Must equal 1.0 for a bounded composite score.
    pub fn sum(&self) -> f64 {
        self.engagement + self.recency + self.title_match
    }
}

/// Configuration for the aggregation pipeline.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Forum source HTTP timeout in seconds, applied per fetch.
    pub forum_timeout_secs: u64,
    /// Video source HTTP timeout in seconds, applied per fetch.
    pub video_timeout_secs: u64,
    /// Default items per page in locally-paginated mode.
    pub page_size: usize,
    /// Upper bound on the locally collected pool, across repeated fetches
    /// of a single source.
    pub pool_limit: usize,
    /// How many items to request from an upstream per fetch.
    pub per_fetch_limit: usize,
    /// Relevance scoring weights. Must sum to 1.0.
    pub weights: ScoringWeights,
    /// Cap applied to `log10(engagement + 1)` before normalisation.
    pub engagement_cap: f64,
    /// Maximum number of groupings returned by the enricher.
    pub grouping_limit: usize,
    /// How long grouping results stay cached per query session, in seconds.
    pub grouping_cache_ttl_secs: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            forum_timeout_secs: 6,
            video_timeout_secs: 8,
            page_size: 15,
            pool_limit: 300,
            per_fetch_limit: 25,
            weights: ScoringWeights::default(),
            engagement_cap: 10.0,
            grouping_limit: 5,
            grouping_cache_ttl_secs: 300,
            user_agent: None,
        }
    }
}

impl AggregatorConfig {
    /// The configured fetch timeout for a given source, in seconds.
    pub fn source_timeout_secs(&self, source: Source) -> u64 {
        match source {
            Source::Forum => self.forum_timeout_secs,
            Source::Video => self.video_timeout_secs,
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.forum_timeout_secs == 0 || self.video_timeout_secs == 0 {
            return Err(SearchError::Config(
                "source timeouts must be greater than 0".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(SearchError::Config(
                "page_size must be greater than 0".into(),
            ));
        }
        if self.pool_limit == 0 {
            return Err(SearchError::Config(
                "pool_limit must be greater than 0".into(),
            ));
        }
        if self.per_fetch_limit == 0 {
            return Err(SearchError::Config(
                "per_fetch_limit must be greater than 0".into(),
            ));
        }
        if (self.weights.sum() - 1.0).abs() > 1e-9 {
            return Err(SearchError::Config(format!(
                "scoring weights must sum to 1.0, got {}",
                self.weights.sum()
            )));
        }
        if self.engagement_cap <= 0.0 {
            return Err(SearchError::Config(
                "engagement_cap must be positive".into(),
            ));
        }
        Ok(())
    }
}
