use crate::queue::traits::KeyValueStore;
use crate::VideoId;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

pub const WATCHED_COOKIE_NAME: &str = "doggyHitsWatched";
pub const WATCHED_RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Browsers drop cookies whose name and value exceed 4096 bytes.
pub const MAX_COOKIE_VALUE_BYTES: usize = 4000;

/// Set of watched video ids persisted in a key-value store as a
/// percent-encoded JSON array.
pub struct WatchedStore {
    store: Box<dyn KeyValueStore>,
    name: String,
    retention: Duration,
}

impl WatchedStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_name(store, WATCHED_COOKIE_NAME, WATCHED_RETENTION)
    }

    pub fn with_name(store: Box<dyn KeyValueStore>, name: &str, retention: Duration) -> Self {
        Self {
            store,
            name: name.to_string(),
            retention,
        }
    }

    pub fn load(&self) -> BTreeSet<VideoId> {
        let raw = match self.store.get(&self.name) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return BTreeSet::new(),
        };

        let decoded = match urlencoding::decode(&raw) {
            Ok(decoded) => decoded,
            Err(error) => {
                warn!(?error, name = self.name.as_str(), "Unable to decode watched videos value");
                return BTreeSet::new();
            }
        };

        match serde_json::from_str::<Vec<VideoId>>(&decoded) {
            Ok(ids) => {
                debug!(count = ids.len(), "Restored watched videos");
                ids.into_iter().collect()
            }
            Err(error) => {
                warn!(?error, name = self.name.as_str(), "Unable to parse watched videos value");
                BTreeSet::new()
            }
        }
    }

    pub fn save(&mut self, ids: &BTreeSet<VideoId>) {
        let encoded = match encode(ids) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(?error, "Unable to serialize watched videos");
                return;
            }
        };

        if encoded.len() > MAX_COOKIE_VALUE_BYTES {
            warn!(
                bytes = encoded.len(),
                count = ids.len(),
                name = self.name.as_str(),
                "Watched videos value exceeds the cookie size limit and may be ignored"
            );
        }

        if let Err(error) = self.store.set(&self.name, &encoded, self.retention) {
            warn!(?error, name = self.name.as_str(), "Unable to persist watched videos");
        }
    }
}

fn encode(ids: &BTreeSet<VideoId>) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(ids)?;

    Ok(urlencoding::encode(&json).into_owned())
}
