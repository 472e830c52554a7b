use crate::services::{
    CredentialProvider, CredentialProviderError, ObjectStorageClient, PagePublisher,
    PublisherError, SecretProvider, VideoSearchError, VideoSearchProvider, YouTubeSearch,
};
use crate::storage::on_disk::OnDiskStorage;
use crate::storage::InMemoryStorage;
use async_trait::async_trait;
use playback_queue::SearchResult;
use search_providers::Video;

#[async_trait]
impl CredentialProvider for SecretProvider {
    async fn get_api_key(&self) -> Result<String, CredentialProviderError> {
        self.get_api_key()
            .await
            .map_err(|error| CredentialProviderError(Box::new(error)))
    }
}

fn to_search_result(video: Video) -> SearchResult {
    SearchResult {
        id: video.video_id,
        title: video.title,
        description: video.description,
        thumbnail_url: video.thumbnail_url,
        published_at: video.published_at,
    }
}

#[async_trait]
impl VideoSearchProvider for YouTubeSearch {
    async fn search(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchResult>, VideoSearchError> {
        let videos = self
            .search(api_key, query, max_results)
            .await
            .map_err(|error| VideoSearchError(Box::new(error)))?;

        Ok(videos.into_iter().map(to_search_result).collect())
    }
}

#[async_trait]
impl PagePublisher for OnDiskStorage {
    async fn publish(
        &self,
        key: &str,
        content: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), PublisherError> {
        self.save(key, &content)
            .await
            .map_err(|error| PublisherError(Box::new(error)))
    }
}

#[async_trait]
impl PagePublisher for ObjectStorageClient {
    async fn publish(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PublisherError> {
        self.put_object(key, content, content_type)
            .await
            .map_err(|error| PublisherError(Box::new(error)))
    }
}

#[async_trait]
impl PagePublisher for InMemoryStorage {
    async fn publish(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PublisherError> {
        self.save(key, content, content_type);

        Ok(())
    }
}
