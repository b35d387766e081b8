//! Fetch-merge-rank-paginate pipeline.
//!
//! `search` orchestrates the concurrent source fan-out; `dedup`, `scoring`,
//! and `paginate` are the pure stages it composes.

pub mod dedup;
pub mod paginate;
pub mod scoring;
pub mod search;
