//! Upstream source adapter implementations.
//!
//! Each module provides a struct implementing [`crate::source::SourceAdapter`]
//! that fetches one upstream and normalizes its records into the common
//! [`crate::types::Item`] shape. Shared normalization helpers (word
//! truncation, timestamp parsing, thumbnail resolution) live in `normalize`.

pub mod forum;
pub(crate) mod normalize;
pub mod video;

pub use forum::ForumAdapter;
pub use video::VideoAdapter;
