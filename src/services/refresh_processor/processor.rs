use super::traits::{
    CredentialProvider, CredentialProviderError, PagePublisher, PublisherError,
    VideoSearchError, VideoSearchProvider,
};
use crate::page::{PageRenderer, RenderError};
use crate::types::{RefreshReport, RunId};
use async_lock::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub(crate) enum RefreshError {
    #[error("Failed to retrieve YouTube API key: {0}")]
    CredentialProviderError(#[from] CredentialProviderError),
    #[error("Error fetching videos: {0}")]
    VideoSearchError(#[from] VideoSearchError),
    #[error(transparent)]
    RenderError(#[from] RenderError),
    #[error("Error publishing page: {0}")]
    PublisherError(#[from] PublisherError),
}

#[derive(Clone, Debug)]
pub(crate) struct RefreshOptions {
    pub(crate) query: String,
    pub(crate) max_results: u32,
    pub(crate) object_key: String,
}

pub(crate) struct RefreshProcessor {
    credential_provider: Arc<dyn CredentialProvider + Send + Sync>,
    search_provider: Arc<dyn VideoSearchProvider + Send + Sync>,
    publisher: Arc<dyn PagePublisher + Send + Sync>,
    renderer: PageRenderer,
    options: RefreshOptions,
    run_lock: Mutex<()>,
}

impl RefreshProcessor {
    pub(crate) fn new(
        credential_provider: Arc<dyn CredentialProvider + Send + Sync>,
        search_provider: Arc<dyn VideoSearchProvider + Send + Sync>,
        publisher: Arc<dyn PagePublisher + Send + Sync>,
        renderer: PageRenderer,
        options: RefreshOptions,
    ) -> Self {
        Self {
            credential_provider,
            search_provider,
            publisher,
            renderer,
            options,
            run_lock: Mutex::new(()),
        }
    }

    /// Fetches the latest videos and republishes the page. Concurrent calls
    /// wait for the running one to finish.
    pub(crate) async fn run(&self) -> Result<RefreshReport, RefreshError> {
        let _guard = self.run_lock.lock().await;
        let run_id = RunId::new();

        info!(%run_id, query = self.options.query.as_str(), "Starting page refresh");

        let result = self.refresh(&run_id).await;

        match &result {
            Ok(report) => {
                info!(
                    %run_id,
                    videos = report.video_count,
                    bytes = report.bytes,
                    key = report.object_key.as_str(),
                    "Page refreshed"
                );
            }
            Err(error) => {
                error!(%run_id, ?error, "Page refresh failed");
            }
        }

        result
    }

    async fn refresh(&self, run_id: &RunId) -> Result<RefreshReport, RefreshError> {
        let api_key = self.credential_provider.get_api_key().await?;

        let results = self
            .search_provider
            .search(&api_key, &self.options.query, self.options.max_results)
            .await?;
        debug!(%run_id, count = results.len(), "Fetched videos");

        let html = self.renderer.render(&results)?;
        let bytes = html.len();

        let content_type = mime_guess::from_path(&self.options.object_key)
            .first_or(mime_guess::mime::TEXT_HTML_UTF_8)
            .to_string();

        self.publisher
            .publish(&self.options.object_key, html.into_bytes(), &content_type)
            .await?;

        Ok(RefreshReport {
            run_id: run_id.clone(),
            video_count: results.len(),
            object_key: self.options.object_key.clone(),
            bytes,
        })
    }
}
