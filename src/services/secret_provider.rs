use crate::config::SecretConfig;
use crate::utils::mask_secret;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, info};

const MIN_API_KEY_LENGTH: usize = 10;

#[derive(Debug, thiserror::Error)]
pub(crate) enum SecretProviderError {
    #[error("No YouTube API secret source is configured")]
    NotConfigured,
    #[error("Unable to read secret file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to decode binary secret: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Secret is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Retrieved secret is empty or invalid")]
    Empty,
    #[error("Secret JSON does not contain expected key. Available keys: {0:?}")]
    MissingKey(Vec<String>),
    #[error("Retrieved API key appears invalid: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SecretSource {
    File(String),
    Base64(String),
    Plain(String),
}

pub(crate) struct SecretProvider {
    source: SecretSource,
    field: String,
}

impl SecretProvider {
    pub(crate) fn new(source: SecretSource, field: &str) -> Self {
        Self {
            source,
            field: field.to_string(),
        }
    }

    pub(crate) fn from_config(config: &SecretConfig) -> Result<Self, SecretProviderError> {
        let source = if let Some(path) = &config.secret_file {
            SecretSource::File(path.clone())
        } else if let Some(encoded) = &config.secret_base64 {
            SecretSource::Base64(encoded.clone())
        } else if let Some(value) = &config.secret {
            SecretSource::Plain(value.clone())
        } else {
            return Err(SecretProviderError::NotConfigured);
        };

        Ok(Self::new(source, &config.secret_field))
    }

    async fn read_raw(&self) -> Result<String, SecretProviderError> {
        match &self.source {
            SecretSource::File(path) => {
                debug!(path = path.as_str(), "Reading secret from file");
                Ok(tokio::fs::read_to_string(path).await?)
            }
            SecretSource::Base64(encoded) => {
                debug!("Decoding binary secret");
                let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
                Ok(String::from_utf8(bytes)?)
            }
            SecretSource::Plain(value) => Ok(value.clone()),
        }
    }

    pub(crate) async fn get_api_key(&self) -> Result<String, SecretProviderError> {
        let raw = self.read_raw().await?;
        let api_key = extract_api_key(&raw, &self.field)?;

        info!(
            api_key = mask_secret(&api_key, 5).as_str(),
            "Retrieved YouTube API key"
        );

        Ok(api_key)
    }
}

/// Pulls the key out of a raw secret that is either a JSON document or the
/// key itself.
pub(crate) fn extract_api_key(raw: &str, field: &str) -> Result<String, SecretProviderError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(SecretProviderError::Empty);
    }

    let api_key = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => {
            let matched = map.get(field).and_then(Value::as_str).or_else(|| {
                map.iter()
                    .filter(|(key, _)| {
                        let key = key.to_lowercase();
                        key.contains("apikey") || key.contains("youtube")
                    })
                    .find_map(|(_, value)| value.as_str())
            });

            match matched {
                Some(value) => value.trim().to_string(),
                // A JSON object without a usable key is rejected instead of
                // sending the raw document to the API as the key.
                None => {
                    return Err(SecretProviderError::MissingKey(
                        map.keys().cloned().collect(),
                    ))
                }
            }
        }
        Ok(Value::String(value)) => value.trim().to_string(),
        _ => raw.to_string(),
    };

    if api_key.len() < MIN_API_KEY_LENGTH {
        return Err(SecretProviderError::InvalidKey(mask_secret(&api_key, 5)));
    }

    Ok(api_key)
}
