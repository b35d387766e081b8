//! Video source adapter — scrapes the video platform's results page.
//!
//! The results page embeds its data as a JSON blob (`ytInitialData`) inside
//! a `<script>` tag. The adapter locates that blob, walks it for video
//! entries (and channel entries, consumed by the enricher), and normalizes
//! them. There is no native continuation token; continuation is emulated as
//! a decimal offset into the oversized entry list each fetch returns.

use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use crate::config::AggregatorConfig;
use crate::error::SearchError;
use crate::http;
use crate::source::{FetchPage, SourceAdapter};
use crate::types::{Grouping, Item, Source};

use super::normalize::{
    absolutize, parse_compact_count, parse_count, parse_timestamp, truncate_words,
};

const RESULTS_URL: &str = "https://www.youtube.com/results";
const WATCH_URL: &str = "https://www.youtube.com/watch";
const CHANNEL_HOST: &str = "https://www.youtube.com";

/// Words kept in the derived short description. Video descriptions run much
/// longer than forum previews, so the cut is looser than the forum's.
const SHORT_DESCRIPTION_WORDS: usize = 150;

/// Video results-page adapter.
///
/// No native continuation: `next_continuation` is an emulated offset token
/// that only drives internal pool collection, never caller-visible paging.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoAdapter;

impl SourceAdapter for VideoAdapter {
    async fn fetch(
        &self,
        query: &str,
        continuation: Option<&str>,
        limit: usize,
        config: &AggregatorConfig,
    ) -> Result<FetchPage, SearchError> {
        tracing::trace!(query, "video search");

        let html = fetch_results_page(query, config).await?;
        let data = extract_initial_data(&html)?;
        let entries = collect_videos(&data);
        tracing::debug!(count = entries.len(), "video entries parsed");

        Ok(window_entries(entries, continuation, limit))
    }

    fn source(&self) -> Source {
        Source::Video
    }
}

async fn fetch_results_page(query: &str, config: &AggregatorConfig) -> Result<String, SearchError> {
    let client = http::build_client(config, Source::Video)?;
    let response = client
        .get(RESULTS_URL)
        .query(&[("search_query", query), ("hl", "en")])
        .header("Accept", "text/html,application/xhtml+xml")
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("video request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("video HTTP error: {e}")))?;

    response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("video response read failed: {e}")))
}

/// Slice an oversized entry list into one emulated-continuation window.
///
/// The token is a decimal offset into the full list; the next token is
/// produced only while entries remain past the window.
pub(crate) fn window_entries(
    entries: Vec<Item>,
    continuation: Option<&str>,
    limit: usize,
) -> FetchPage {
    let offset = continuation
        .and_then(|t| t.parse::<usize>().ok())
        .unwrap_or(0);
    let next = (offset + limit < entries.len()).then(|| (offset + limit).to_string());
    let items = entries.into_iter().skip(offset).take(limit).collect();
    FetchPage {
        items,
        next_continuation: next,
    }
}

/// Locate and parse the embedded results JSON out of the page HTML.
pub(crate) fn extract_initial_data(html: &str) -> Result<Value, SearchError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script")
        .map_err(|e| SearchError::Parse(format!("invalid script selector: {e:?}")))?;

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        let Some(marker) = text.find("ytInitialData") else {
            continue;
        };
        let Some(brace) = text[marker..].find('{') else {
            continue;
        };
        // Parse exactly one JSON value; trailing statements in the same
        // script are ignored.
        let mut deserializer = serde_json::Deserializer::from_str(&text[marker + brace..]);
        if let Ok(value) = Value::deserialize(&mut deserializer) {
            return Ok(value);
        }
    }

    Err(SearchError::Parse(
        "results page has no parseable embedded data".into(),
    ))
}

/// Walk the embedded data for video entries, in page order.
pub(crate) fn collect_videos(data: &Value) -> Vec<Item> {
    result_contents(data)
        .filter_map(|entry| entry.get("videoRenderer"))
        .filter_map(normalize_video)
        .collect()
}

/// Walk the embedded data for channel entries, in page order.
pub(crate) fn collect_channels(data: &Value, limit: usize) -> Vec<Grouping> {
    result_contents(data)
        .filter_map(|entry| entry.get("channelRenderer"))
        .filter_map(normalize_channel)
        .take(limit)
        .collect()
}

/// Iterator over the flat result entries inside the section list.
fn result_contents(data: &Value) -> impl Iterator<Item = &Value> {
    data.pointer("/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|section| {
            section
                .pointer("/itemSectionRenderer/contents")
                .and_then(Value::as_array)
        })
        .flatten()
}

fn normalize_video(renderer: &Value) -> Option<Item> {
    let id = renderer.get("videoId").and_then(Value::as_str)?;

    let title = runs_text(renderer.pointer("/title/runs"));
    let full_text = runs_text(renderer.pointer("/descriptionSnippet/runs"));

    Some(Item {
        short_description: truncate_words(&full_text, SHORT_DESCRIPTION_WORDS),
        full_text,
        target_url: format!("{WATCH_URL}?v={id}"),
        author_or_channel: runs_text(renderer.pointer("/ownerText/runs")),
        created_at: renderer.get("uploadDate").and_then(parse_timestamp),
        thumbnail_url: last_thumbnail(renderer),
        engagement: renderer
            .pointer("/viewCountText/simpleText")
            .and_then(Value::as_str)
            .map(parse_count)
            .unwrap_or(0),
        source: Source::Video,
        ranking_score: 0.0,
        title,
    })
}

fn normalize_channel(renderer: &Value) -> Option<Grouping> {
    let name = renderer
        .pointer("/title/simpleText")
        .and_then(Value::as_str)?
        .to_string();

    let canonical_url = renderer
        .pointer("/navigationEndpoint/browseEndpoint/canonicalBaseUrl")
        .and_then(Value::as_str)
        .map(|path| format!("{CHANNEL_HOST}{path}"))
        .or_else(|| {
            renderer
                .get("channelId")
                .and_then(Value::as_str)
                .map(|id| format!("{CHANNEL_HOST}/channel/{id}"))
        })?;

    Some(Grouping {
        name,
        subscriber_count: renderer
            .pointer("/subscriberCountText/simpleText")
            .and_then(Value::as_str)
            .and_then(parse_compact_count),
        icon_url: last_thumbnail(renderer),
        canonical_url,
    })
}

/// Concatenate the `text` fields of a `runs` array.
fn runs_text(runs: Option<&Value>) -> String {
    runs.and_then(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|run| run.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Highest-resolution thumbnail — the platform lists them smallest first.
fn last_thumbnail(renderer: &Value) -> Option<String> {
    renderer
        .pointer("/thumbnail/thumbnails")
        .and_then(Value::as_array)
        .and_then(|thumbs| thumbs.last())
        .and_then(|thumb| thumb.get("url"))
        .and_then(Value::as_str)
        .and_then(absolutize)
}
