use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Request};
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub(crate) enum ObjectStorageClientError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error("Object storage responded with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Uploads objects with plain `PUT {endpoint}/{bucket}/{key}` requests.
pub(crate) struct ObjectStorageClient {
    client: Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl ObjectStorageClient {
    pub(crate) fn create(
        endpoint: &str,
        bucket: &str,
        token: Option<String>,
    ) -> Result<Self, ObjectStorageClientError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.trim_matches('/').to_string(),
            token,
        })
    }

    pub(crate) fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            self.bucket,
            key.trim_start_matches('/')
        )
    }

    pub(crate) fn put_request(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<Request, ObjectStorageClientError> {
        let mut builder = self
            .client
            .put(self.object_url(key))
            .header(CONTENT_TYPE, content_type)
            .body(content);

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        Ok(builder.build()?)
    }

    pub(crate) async fn put_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStorageClientError> {
        let request = self.put_request(key, content, content_type)?;

        let response = self.client.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, key, "Object storage rejected upload");

            return Err(ObjectStorageClientError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!(%status, key, bucket = self.bucket.as_str(), "Object uploaded");

        Ok(())
    }
}
