//! Forum source adapter — reddit-style search listing API.
//!
//! Fetches `search.json` from the public listing endpoint. The payload is a
//! JSON listing: `data.children[].data` holds the posts and `data.after` is
//! the native continuation token, relayed verbatim in upstream-paginated
//! mode.

use serde_json::Value;

use crate::config::AggregatorConfig;
use crate::error::SearchError;
use crate::http;
use crate::source::{FetchPage, SourceAdapter};
use crate::types::{Item, Source};

use super::normalize::{
    looks_like_image_url, parse_timestamp, resolve_thumbnail, truncate_words, unescape_entities,
    UrlExtractor,
};

const SEARCH_URL: &str = "https://www.reddit.com/r/all/search.json";
const PERMALINK_HOST: &str = "https://www.reddit.com";

/// Words kept in the derived short description.
const SHORT_DESCRIPTION_WORDS: usize = 50;

/// Upstream sort orders for the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForumSort {
    /// Default relevance ranking.
    Relevance,
    /// Top-scored posts — used by the first-page broaden fetch to widen
    /// the candidate pool.
    Top,
}

impl ForumSort {
    fn as_param(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Top => "top",
        }
    }
}

/// Forum listing adapter.
///
/// Carries a native continuation token (`data.after`), so it is the adapter
/// that backs upstream-paginated mode.
#[derive(Debug, Clone, Copy)]
pub struct ForumAdapter {
    sort: ForumSort,
}

impl Default for ForumAdapter {
    fn default() -> Self {
        Self {
            sort: ForumSort::Relevance,
        }
    }
}

impl ForumAdapter {
    /// Adapter variant using the secondary `top` sort order.
    pub fn top() -> Self {
        Self { sort: ForumSort::Top }
    }
}

impl SourceAdapter for ForumAdapter {
    async fn fetch(
        &self,
        query: &str,
        continuation: Option<&str>,
        limit: usize,
        config: &AggregatorConfig,
    ) -> Result<FetchPage, SearchError> {
        tracing::trace!(query, sort = self.sort.as_param(), "forum search");

        let client = http::build_client(config, Source::Forum)?;

        let limit_param = limit.to_string();
        let mut params = vec![
            ("q", query),
            ("sort", self.sort.as_param()),
            ("limit", limit_param.as_str()),
            ("raw_json", "1"),
        ];
        if let Some(after) = continuation {
            params.push(("after", after));
        }

        let response = client
            .get(SEARCH_URL)
            .query(&params)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("forum request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("forum HTTP error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("forum response read failed: {e}")))?;

        tracing::trace!(bytes = body.len(), "forum response received");

        parse_listing(&body)
    }

    fn source(&self) -> Source {
        Source::Forum
    }

    fn supports_continuation(&self) -> bool {
        true
    }
}

/// Parse a forum listing payload into a normalized batch.
///
/// Separate from the fetch path so the parser can be exercised with fixture
/// payloads. Malformed posts are skipped, never failing the batch.
pub(crate) fn parse_listing(body: &str) -> Result<FetchPage, SearchError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("forum listing is not valid JSON: {e}")))?;

    let children = root
        .pointer("/data/children")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Parse("forum listing missing data.children".into()))?;

    let items: Vec<Item> = children
        .iter()
        .filter_map(|child| child.get("data"))
        .filter_map(normalize_post)
        .collect();

    let next_continuation = root
        .pointer("/data/after")
        .and_then(Value::as_str)
        .map(str::to_string);

    tracing::debug!(count = items.len(), "forum posts parsed");
    Ok(FetchPage {
        items,
        next_continuation,
    })
}

/// Normalize one raw post record. Returns `None` when the record carries
/// neither a title nor a target URL — such a record has no identity key.
fn normalize_post(data: &Value) -> Option<Item> {
    let title = data
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();

    let target_url = post_target_url(data);
    if title.is_empty() && target_url.is_empty() {
        return None;
    }

    let full_text = data
        .get("selftext")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    Some(Item {
        short_description: truncate_words(&full_text, SHORT_DESCRIPTION_WORDS),
        full_text,
        target_url,
        author_or_channel: data
            .get("author")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        created_at: data.get("created_utc").and_then(parse_timestamp),
        thumbnail_url: resolve_thumbnail(data, THUMBNAIL_CHAIN),
        engagement: data
            .get("score")
            .and_then(Value::as_i64)
            .unwrap_or(0)
            .max(0) as u64,
        source: Source::Forum,
        ranking_score: 0.0,
        title,
    })
}

/// Canonical link for a post: the destination URL when present, otherwise
/// the permalink resolved against the forum host.
fn post_target_url(data: &Value) -> String {
    if let Some(url) = data.get("url").and_then(Value::as_str) {
        let url = url.trim();
        if !url.is_empty() {
            return url.to_string();
        }
    }
    match data.get("permalink").and_then(Value::as_str) {
        Some(path) if !path.is_empty() => format!("{PERMALINK_HOST}{path}"),
        _ => String::new(),
    }
}

/// Thumbnail extractor chain, highest priority first: the structured
/// preview image, then a destination URL that is itself an image, then the
/// legacy `thumbnail` field (whose placeholder values are not URLs and fall
/// out naturally during resolution).
const THUMBNAIL_CHAIN: &[UrlExtractor] = &[preview_image, destination_image, thumbnail_field];

fn preview_image(data: &Value) -> Option<String> {
    data.pointer("/preview/images/0/source/url")
        .and_then(Value::as_str)
        .map(unescape_entities)
}

fn destination_image(data: &Value) -> Option<String> {
    let url = data.get("url").and_then(Value::as_str)?;
    looks_like_image_url(url).then(|| url.to_string())
}

fn thumbnail_field(data: &Value) -> Option<String> {
    data.get("thumbnail")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_next123",
            "children": [
                {
                    "kind": "t3",
                    "data": {
                        "title": "Why borrow checking matters",
                        "selftext": "A long discussion about ownership and borrowing in systems languages with many more words than the preview keeps around for display purposes.",
                        "url": "https://example.com/articles/borrowing",
                        "permalink": "/r/programming/comments/abc/why_borrow/",
                        "author": "rustacean",
                        "created_utc": 1700000000.0,
                        "score": 4321,
                        "preview": {
                            "images": [
                                {"source": {"url": "https://p.example.com/img.png?auto=webp&amp;s=abc"}}
                            ]
                        },
                        "thumbnail": "https://t.example.com/small.jpg"
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "title": "Photo of the launch",
                        "selftext": "",
                        "url": "https://i.example.com/launch.jpg",
                        "permalink": "/r/space/comments/def/photo/",
                        "author": "stargazer",
                        "created_utc": "not a number",
                        "score": -5,
                        "thumbnail": "nsfw"
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "title": "",
                        "selftext": "orphan record",
                        "url": "",
                        "permalink": "",
                        "author": "ghost",
                        "created_utc": 1700000001,
                        "score": 10
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "title": "Text only post",
                        "selftext": "short body",
                        "url": "",
                        "permalink": "/r/rust/comments/ghi/text_only/",
                        "author": "writer",
                        "created_utc": 1700000002,
                        "score": 7,
                        "thumbnail": "self"
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn parse_mock_listing_returns_items_and_token() {
        let page = parse_listing(MOCK_LISTING).expect("should parse");
        assert_eq!(page.items.len(), 3); // identity-less record dropped
        assert_eq!(page.next_continuation.as_deref(), Some("t3_next123"));
    }

    #[test]
    fn post_fields_normalized() {
        let page = parse_listing(MOCK_LISTING).expect("should parse");
        let first = &page.items[0];
        assert_eq!(first.title, "Why borrow checking matters");
        assert_eq!(first.target_url, "https://example.com/articles/borrowing");
        assert_eq!(first.author_or_channel, "rustacean");
        assert_eq!(first.engagement, 4321);
        assert_eq!(first.source, Source::Forum);
        assert_eq!(
            first.created_at.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert!(first.short_description.ends_with('…'));
        assert!(first.full_text.starts_with("A long discussion"));
    }

    #[test]
    fn preview_image_beats_other_thumbnail_sources() {
        let page = parse_listing(MOCK_LISTING).expect("should parse");
        assert_eq!(
            page.items[0].thumbnail_url.as_deref(),
            Some("https://p.example.com/img.png?auto=webp&s=abc")
        );
    }

    #[test]
    fn destination_image_used_when_no_preview() {
        let page = parse_listing(MOCK_LISTING).expect("should parse");
        let photo = &page.items[1];
        // "nsfw" placeholder in the thumbnail field is never a URL; the
        // destination link is an image, so it wins.
        assert_eq!(
            photo.thumbnail_url.as_deref(),
            Some("https://i.example.com/launch.jpg")
        );
    }

    #[test]
    fn bad_timestamp_is_absent_and_negative_score_clamped() {
        let page = parse_listing(MOCK_LISTING).expect("should parse");
        let photo = &page.items[1];
        assert!(photo.created_at.is_none());
        assert_eq!(photo.engagement, 0);
    }

    #[test]
    fn empty_destination_falls_back_to_permalink() {
        let page = parse_listing(MOCK_LISTING).expect("should parse");
        let text_post = &page.items[2];
        assert_eq!(
            text_post.target_url,
            "https://www.reddit.com/r/rust/comments/ghi/text_only/"
        );
        // "self" placeholder resolves to no thumbnail.
        assert!(text_post.thumbnail_url.is_none());
    }

    #[test]
    fn empty_selftext_yields_empty_short_description() {
        let page = parse_listing(MOCK_LISTING).expect("should parse");
        assert_eq!(page.items[1].short_description, "");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_listing("not json").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn missing_children_is_a_parse_error() {
        let err = parse_listing(r#"{"data": {}}"#).unwrap_err();
        assert!(err.to_string().contains("data.children"));
    }

    #[test]
    fn listing_without_after_has_no_continuation() {
        let body = r#"{"data": {"after": null, "children": []}}"#;
        let page = parse_listing(body).expect("should parse");
        assert!(page.items.is_empty());
        assert!(page.next_continuation.is_none());
    }

    #[test]
    fn adapter_identity() {
        let adapter = ForumAdapter::default();
        assert_eq!(adapter.source(), Source::Forum);
        assert!(adapter.supports_continuation());
        assert_eq!(ForumAdapter::top().sort, ForumSort::Top);
    }

    #[tokio::test]
    #[ignore] // Live test — run with `cargo test -- --ignored`
    async fn live_forum_search() {
        let adapter = ForumAdapter::default();
        let config = AggregatorConfig::default();
        let page = adapter.fetch("rust programming", None, 10, &config).await;
        if let Ok(page) = page {
            for item in &page.items {
                assert!(!item.title.is_empty() || !item.target_url.is_empty());
            }
        }
    }
}
