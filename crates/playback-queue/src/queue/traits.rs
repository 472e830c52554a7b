use crate::queue::types::{PlayerState, PlayerView, QueueEntry, TimerEvent, TimerHandle};
use crate::VideoId;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Persisted store is not available: {0}")]
    Unavailable(String),
}

/// Name/value storage with expiry, e.g. a cookie jar.
pub trait KeyValueStore {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str, max_age: Duration) -> Result<(), StoreError>;
}

/// Cancellable one-shot timers. Fired timers are delivered back through
/// `PlaybackController::on_timer`.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Player is not bound to any video")]
    NotBound,
    #[error("Player API is not loaded yet")]
    NotReady,
    #[error("Player call failed: {0}")]
    Call(String),
}

/// Command surface of the embeddable player.
pub trait Player {
    fn bind(&mut self, entry: &QueueEntry) -> Result<(), PlayerError>;
    fn unbind(&mut self);
    fn state(&self) -> Result<PlayerState, PlayerError>;
    fn current_time(&self) -> Result<f64, PlayerError>;
    fn duration(&self) -> Result<f64, PlayerError>;
    fn unmute(&mut self) -> Result<(), PlayerError>;
    fn play(&mut self) -> Result<(), PlayerError>;
    fn show_controls(&mut self) -> Result<(), PlayerError>;
}

/// The page elements around the player: modal, counter, controls and the
/// grid of items.
pub trait Surface {
    fn show(&mut self, view: &PlayerView<'_>);
    fn hide(&mut self);
    fn mark_watched(&mut self, id: &VideoId);
}
