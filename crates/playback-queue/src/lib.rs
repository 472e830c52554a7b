mod queue;
pub use queue::*;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::mount;

use serde::{Deserialize, Serialize};
use std::ops::Deref;

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub(crate) String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Deref for VideoId {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for VideoId {
    fn from(value: &str) -> Self {
        VideoId(value.to_string())
    }
}

impl From<String> for VideoId {
    fn from(value: String) -> Self {
        VideoId(value)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
