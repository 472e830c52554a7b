mod parser;


use crate::Videos;
use parser::{parse_search_response, SearchResponse};
use reqwest::{Client, Request};
use serde::Serialize;
use tracing::debug;

pub use parser::ParseError;

const YOUTUBE_API_HOST: &str = "https://www.googleapis.com";
const SEARCH_PATH: &str = "/youtube/v3/search";

/// Upper bound of `maxResults` accepted by the search endpoint.
pub const MAX_RESULTS_PER_PAGE: u32 = 50;

#[derive(Debug, thiserror::Error)]
pub enum YouTubeClientError {
    #[error("Error fetching videos: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error("YouTube API Error: {message}")]
    ApiError { code: u16, message: String },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SearchOrder {
    Date,
    Rating,
    Relevance,
    ViewCount,
}

pub struct YouTubeClient {
    client: Client,
    api_key: String,
    host: String,
}

impl YouTubeClient {
    pub fn create(api_key: &str) -> Result<Self, YouTubeClientError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            host: YOUTUBE_API_HOST.to_string(),
        })
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.trim_end_matches('/').to_string();
        self
    }

    /// Single page of videos matching `query`, newest first when ordered by
    /// date.
    pub async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
        order: SearchOrder,
    ) -> Result<Videos, YouTubeClientError> {
        let request = self.search_request(query, max_results, order)?;

        let response = self.client.execute(request).await?;
        let status = response.status();
        let raw_json = response.text().await?;

        debug!(%status, bytes = raw_json.len(), "Received search response");

        match parse_search_response(&raw_json)? {
            SearchResponse::Videos(videos) => Ok(videos),
            SearchResponse::Error { code, message } => {
                Err(YouTubeClientError::ApiError { code, message })
            }
        }
    }

    pub(crate) fn search_request(
        &self,
        query: &str,
        max_results: u32,
        order: SearchOrder,
    ) -> Result<Request, YouTubeClientError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Query<'a> {
            part: &'a str,
            max_results: u32,
            q: &'a str,
            #[serde(rename = "type")]
            kind: &'a str,
            order: SearchOrder,
            key: &'a str,
        }

        let query = Query {
            part: "snippet",
            max_results: max_results.min(MAX_RESULTS_PER_PAGE),
            q: query,
            kind: "video",
            order,
            key: &self.api_key,
        };

        Ok(self
            .client
            .get(format!("{}{}", self.host, SEARCH_PATH))
            .query(&query)
            .build()?)
    }
}
