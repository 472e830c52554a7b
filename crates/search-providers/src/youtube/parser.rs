use crate::{Video, VideoId, Videos};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Error parsing YouTube API response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, PartialEq)]
pub(crate) enum SearchResponse {
    Videos(Videos),
    Error { code: u16, message: String },
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    items: Vec<RawItem>,
    error: Option<RawError>,
}

#[derive(Deserialize)]
struct RawError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct RawItem {
    id: RawItemId,
    snippet: Option<RawSnippet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemId {
    video_id: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawSnippet {
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: RawThumbnails,
}

#[derive(Deserialize, Default)]
struct RawThumbnails {
    default: Option<RawThumbnail>,
    medium: Option<RawThumbnail>,
    high: Option<RawThumbnail>,
}

#[derive(Deserialize)]
struct RawThumbnail {
    url: String,
}

impl RawThumbnails {
    fn best_url(self) -> String {
        self.high
            .or(self.medium)
            .or(self.default)
            .map(|thumbnail| thumbnail.url)
            .unwrap_or_default()
    }
}

/// The API escapes snippet text as HTML; undo the entities it uses.
pub(crate) fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub(crate) fn parse_search_response(raw_json: &str) -> Result<SearchResponse, ParseError> {
    let response: RawResponse = serde_json::from_str(raw_json)?;

    if let Some(RawError { code, message }) = response.error {
        return Ok(SearchResponse::Error { code, message });
    }

    let videos = response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            let snippet = item.snippet.unwrap_or_default();

            Some(Video {
                video_id: VideoId::from(video_id),
                title: decode_html_entities(&snippet.title),
                description: decode_html_entities(&snippet.description),
                thumbnail_url: snippet.thumbnails.best_url(),
                published_at: snippet.published_at,
                channel_title: decode_html_entities(&snippet.channel_title),
            })
        })
        .collect();

    Ok(SearchResponse::Videos(videos))
}
