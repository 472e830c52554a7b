use async_trait::async_trait;
use playback_queue::SearchResult;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct CredentialProviderError(pub(crate) Box<dyn std::error::Error + Send + Sync>);

#[async_trait]
pub(crate) trait CredentialProvider {
    async fn get_api_key(&self) -> Result<String, CredentialProviderError>;
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct VideoSearchError(pub(crate) Box<dyn std::error::Error + Send + Sync>);

#[async_trait]
pub(crate) trait VideoSearchProvider {
    async fn search(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchResult>, VideoSearchError>;
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct PublisherError(pub(crate) Box<dyn std::error::Error + Send + Sync>);

#[async_trait]
pub(crate) trait PagePublisher {
    async fn publish(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PublisherError>;
}
