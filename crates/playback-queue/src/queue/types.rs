use crate::VideoId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single search hit as embedded into the generated page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub published_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub id: VideoId,
    pub title: String,
    pub description: String,
}

impl From<&SearchResult> for QueueEntry {
    fn from(result: &SearchResult) -> Self {
        Self {
            id: result.id.clone(),
            title: result.title.clone(),
            description: result.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Playing(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    pub(crate) fn apply(&self, index: usize) -> Option<usize> {
        match self {
            Direction::Previous => index.checked_sub(1),
            Direction::Next => index.checked_add(1),
        }
    }
}

/// Playback states reported by the embeddable player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
    Other(i32),
}

impl From<i32> for PlayerState {
    fn from(value: i32) -> Self {
        match value {
            -1 => PlayerState::Unstarted,
            0 => PlayerState::Ended,
            1 => PlayerState::Playing,
            2 => PlayerState::Paused,
            3 => PlayerState::Buffering,
            5 => PlayerState::Cued,
            other => PlayerState::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Advance,
    Close,
    NearEndPoll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

impl std::fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the player surface renders for the current queue position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView<'a> {
    pub entry: &'a QueueEntry,
    pub index: usize,
    pub total: usize,
}

impl PlayerView<'_> {
    pub fn previous_enabled(&self) -> bool {
        self.index > 0
    }

    pub fn next_enabled(&self) -> bool {
        self.index + 1 < self.total
    }

    pub fn counter_text(&self) -> String {
        format!("Video {} of {}", self.index + 1, self.total)
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub end_delay: Duration,
    pub poll_interval: Duration,
    pub near_end_threshold: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            end_delay: Duration::from_secs(1),
            poll_interval: Duration::from_millis(200),
            near_end_threshold: Duration::from_secs(2),
        }
    }
}
