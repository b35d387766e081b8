//! Composite relevance scoring.
//!
//! Each item's score is a weighted sum of three sub-scores, every one
//! independently bounded to `[0, 1]` before weighting:
//!
//! - engagement: `min(log10(n + 1), cap) / cap` — logarithmic damping so
//!   viral items do not dominate linearly
//! - recency: `1 / (1 + days/365)` — asymptotic, never reaches zero; a
//!   missing timestamp scores the neutral 0.5 rather than being penalised
//! - match: whole-query substring hit on the title scores 1.0, otherwise
//!   the fraction of query tokens appearing in the title
//!
//! With weights summing to 1.0 the composite stays in `[0, 1]`.

use chrono::{DateTime, Utc};

use crate::config::{AggregatorConfig, ScoringWeights};
use crate::types::Item;

/// Recency sub-score for items with no parseable creation time.
const NEUTRAL_RECENCY: f64 = 0.5;

/// Composite relevance scorer. Construct once per request from config.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
    engagement_cap: f64,
}

impl RelevanceScorer {
    /// Build a scorer from validated configuration.
    pub fn new(config: &AggregatorConfig) -> Self {
        Self {
            weights: config.weights,
            engagement_cap: config.engagement_cap,
        }
    }

    /// Score one item against the query. Deterministic for a fixed `now`.
    pub fn score_at(&self, item: &Item, query: &str, now: DateTime<Utc>) -> f64 {
        self.weights.engagement * self.engagement_score(item.engagement)
            + self.weights.recency * recency_score(item.created_at, now)
            + self.weights.title_match * match_score(&item.title, query)
    }

    /// Score one item against the query at the current instant.
    pub fn score(&self, item: &Item, query: &str) -> f64 {
        self.score_at(item, query, Utc::now())
    }

    /// Fill in `ranking_score` for every item, sharing one `now` so a slow
    /// pool walk cannot skew relative recency.
    pub fn score_all(&self, items: &mut [Item], query: &str) {
        let now = Utc::now();
        for item in items.iter_mut() {
            item.ranking_score = self.score_at(item, query, now);
        }
    }

    fn engagement_score(&self, engagement: u64) -> f64 {
        let damped = ((engagement as f64) + 1.0).log10();
        damped.min(self.engagement_cap) / self.engagement_cap
    }
}

fn recency_score(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(created) = created_at else {
        return NEUTRAL_RECENCY;
    };
    // Future-dated records count as zero days old, keeping the score ≤ 1.
    let days = ((now - created).num_seconds().max(0) as f64) / 86_400.0;
    1.0 / (1.0 + days / 365.0)
}

fn match_score(title: &str, query: &str) -> f64 {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        // An empty query matches everything by convention.
        return 1.0;
    }
    let title = title.to_lowercase();
    if title.contains(&query) {
        return 1.0;
    }
    let tokens: Vec<&str> = query.split_whitespace().collect();
    let matched = tokens.iter().filter(|token| title.contains(**token)).count();
    matched as f64 / tokens.len() as f64
}
