//! Error types for the multifeed crate.
//!
//! Per-record parse problems never surface here — a malformed field is
//! blanked or the record is dropped at the adapter boundary. These variants
//! cover whole-request failures and configuration mistakes.

/// Errors that can occur during feed aggregation.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query was missing or empty after trimming. Reported before any
    /// upstream call is made.
    #[error("query must not be empty")]
    EmptyQuery,

    /// Every dispatched source failed. Distinct from a legitimate
    /// zero-result answer, which is a successful response with no items.
    #[error("all sources failed: {0}")]
    AllSourcesFailed(String),

    /// A source fetch exceeded its configured timeout.
    #[error("source timed out: {0}")]
    Timeout(String),

    /// An HTTP request to an upstream failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse an upstream payload.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid aggregator configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for multifeed results.
pub type Result<T> = std::result::Result<T, SearchError>;
