use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StoredObject {
    pub(crate) content_type: String,
    pub(crate) content: Vec<u8>,
}

pub(crate) struct InMemoryStorage {
    storage: Mutex<HashMap<String, StoredObject>>,
}

impl InMemoryStorage {
    pub(crate) fn new() -> Self {
        Self {
            storage: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn save(&self, key: &str, content: Vec<u8>, content_type: &str) {
        let mut guard = self.storage.lock().unwrap_or_else(|error| error.into_inner());

        let previous = guard.insert(
            key.into(),
            StoredObject {
                content_type: content_type.into(),
                content,
            },
        );

        if let Some(previous) = previous {
            debug!(
                key,
                previous_bytes = previous.content.len(),
                previous_content_type = previous.content_type.as_str(),
                "Replaced stored object"
            );
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<StoredObject> {
        let guard = self.storage.lock().unwrap_or_else(|error| error.into_inner());

        guard.get(key).cloned()
    }
}
