use search_providers::{SearchOrder, Videos, YouTubeClient, YouTubeClientError};
use tracing::debug;

/// Searches YouTube with a key that is only known at run time.
pub(crate) struct YouTubeSearch {
    api_host: Option<String>,
    order: SearchOrder,
}

impl YouTubeSearch {
    pub(crate) fn new(api_host: Option<String>) -> Self {
        Self {
            api_host,
            order: SearchOrder::Date,
        }
    }

    fn client(&self, api_key: &str) -> Result<YouTubeClient, YouTubeClientError> {
        let client = YouTubeClient::create(api_key)?;

        Ok(match &self.api_host {
            Some(host) => client.with_host(host),
            None => client,
        })
    }

    pub(crate) async fn search(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Videos, YouTubeClientError> {
        debug!(query, max_results, order = ?self.order, "Searching videos");

        self.client(api_key)?
            .search_videos(query, max_results, self.order)
            .await
    }
}
