use crate::queue::builder::build_queue;
use crate::queue::traits::{Player, PlayerError, Scheduler, Surface};
use crate::queue::types::{
    ControllerSettings, ControllerState, Direction, PlayerState, PlayerView, QueueEntry,
    SearchResult, TimerEvent, TimerHandle,
};
use crate::queue::watched::WatchedStore;
use crate::VideoId;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Owns the playback queue, the watched set and the timers of the page
/// player. Every transition goes through `play_at` or `close`.
pub struct PlaybackController {
    results: Vec<SearchResult>,
    queue: Vec<QueueEntry>,
    state: ControllerState,
    watched: BTreeSet<VideoId>,
    watched_store: WatchedStore,
    player: Box<dyn Player>,
    scheduler: Box<dyn Scheduler>,
    surface: Box<dyn Surface>,
    settings: ControllerSettings,
    end_timer: Option<TimerHandle>,
    poll_timer: Option<TimerHandle>,
    near_end_signalled: bool,
}

impl PlaybackController {
    pub fn new(
        results: Vec<SearchResult>,
        watched_store: WatchedStore,
        player: Box<dyn Player>,
        scheduler: Box<dyn Scheduler>,
        surface: Box<dyn Surface>,
    ) -> Self {
        Self::with_settings(
            results,
            watched_store,
            player,
            scheduler,
            surface,
            ControllerSettings::default(),
        )
    }

    pub fn with_settings(
        results: Vec<SearchResult>,
        watched_store: WatchedStore,
        player: Box<dyn Player>,
        scheduler: Box<dyn Scheduler>,
        surface: Box<dyn Surface>,
        settings: ControllerSettings,
    ) -> Self {
        let watched = watched_store.load();
        let mut controller = Self {
            results,
            queue: vec![],
            state: ControllerState::Idle,
            watched,
            watched_store,
            player,
            scheduler,
            surface,
            settings,
            end_timer: None,
            poll_timer: None,
            near_end_signalled: false,
        };

        for result in &controller.results {
            if controller.watched.contains(&result.id) {
                controller.surface.mark_watched(&result.id);
            }
        }

        controller
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            ControllerState::Playing(index) => Some(index),
            ControllerState::Idle => None,
        }
    }

    pub fn is_queue_mode_active(&self) -> bool {
        matches!(self.state, ControllerState::Playing(_))
    }

    pub fn watched_ids(&self) -> &BTreeSet<VideoId> {
        &self.watched
    }

    pub fn is_watched(&self, id: &VideoId) -> bool {
        self.watched.contains(id)
    }

    pub fn queue(&self) -> &[QueueEntry] {
        &self.queue
    }

    pub fn has_pending_timers(&self) -> bool {
        self.end_timer.is_some() || self.poll_timer.is_some()
    }

    /// Plays the whole queue from the first entry.
    pub fn start(&mut self) {
        self.queue = build_queue(&self.results);

        if self.queue.is_empty() {
            debug!("Queue is empty, nothing to play");
            return;
        }

        info!(total = self.queue.len(), "Starting queue playback");
        self.play_at(0);
    }

    /// Plays the queue from the clicked item onwards.
    pub fn select_at(&mut self, index: usize) {
        self.queue = build_queue(&self.results);

        if index >= self.queue.len() {
            warn!(index, total = self.queue.len(), "Selected item is out of range");
            return;
        }

        self.play_at(index);
    }

    pub fn advance(&mut self, direction: Direction) {
        let ControllerState::Playing(index) = self.state else {
            debug!(?direction, "Ignoring advance while idle");
            return;
        };

        match direction.apply(index) {
            Some(next) if next < self.queue.len() => self.play_at(next),
            _ => debug!(index, ?direction, "Already at the edge of the queue"),
        }
    }

    /// Closes the player. Safe to call in any state.
    pub fn close(&mut self) {
        self.cancel_timers();
        self.player.unbind();
        self.surface.hide();

        if self.is_queue_mode_active() {
            info!("Playback closed");
        }

        self.state = ControllerState::Idle;
        self.near_end_signalled = false;
    }

    pub fn on_player_ready(&mut self) {
        if !self.is_queue_mode_active() {
            return;
        }

        if let Some(handle) = self.poll_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.poll_timer = Some(
            self.scheduler
                .schedule(self.settings.poll_interval, TimerEvent::NearEndPoll),
        );
    }

    pub fn on_player_state_change(&mut self, player_state: PlayerState) {
        if player_state != PlayerState::Ended {
            return;
        }

        let ControllerState::Playing(index) = self.state else {
            return;
        };

        let event = if index + 1 < self.queue.len() {
            TimerEvent::Advance
        } else {
            TimerEvent::Close
        };

        debug!(index, ?event, "Video ended");

        if let Some(handle) = self.end_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.end_timer = Some(self.scheduler.schedule(self.settings.end_delay, event));
    }

    pub fn on_timer(&mut self, handle: TimerHandle, event: TimerEvent) {
        match event {
            TimerEvent::Advance | TimerEvent::Close => {
                if self.end_timer != Some(handle) {
                    debug!(%handle, "Ignoring stale end timer");
                    return;
                }
                self.end_timer = None;

                match (event, self.state) {
                    (TimerEvent::Advance, ControllerState::Playing(index))
                        if index + 1 < self.queue.len() =>
                    {
                        self.play_at(index + 1)
                    }
                    _ => self.close(),
                }
            }
            TimerEvent::NearEndPoll => {
                if self.poll_timer != Some(handle) {
                    debug!(%handle, "Ignoring stale poll timer");
                    return;
                }
                self.poll_timer = None;

                if !self.is_queue_mode_active() {
                    return;
                }

                self.check_near_end();
                self.poll_timer = Some(
                    self.scheduler
                        .schedule(self.settings.poll_interval, TimerEvent::NearEndPoll),
                );
            }
        }
    }

    fn play_at(&mut self, index: usize) {
        self.cancel_timers();
        self.state = ControllerState::Playing(index);
        self.near_end_signalled = false;

        let entry = self.queue[index].clone();

        if self.watched.insert(entry.id.clone()) {
            self.watched_store.save(&self.watched);
        }
        self.surface.mark_watched(&entry.id);

        let view = PlayerView {
            entry: &entry,
            index,
            total: self.queue.len(),
        };
        self.surface.show(&view);

        debug!(index, id = %entry.id, "Playing queue entry");

        if let Err(error) = self.player.bind(&entry) {
            warn!(?error, id = %entry.id, "Unable to bind player");
        }
    }

    fn check_near_end(&mut self) {
        let remaining = match self.remaining_seconds() {
            Ok(Some(remaining)) => remaining,
            Ok(None) => return,
            Err(error) => {
                debug!(?error, "Unable to query player position");
                return;
            }
        };

        let threshold = self.settings.near_end_threshold.as_secs_f64();

        if remaining > threshold {
            self.near_end_signalled = false;
            return;
        }

        if remaining <= 0.0 || self.near_end_signalled {
            return;
        }

        self.near_end_signalled = true;
        debug!(remaining, "Video is about to end");

        if let Err(error) = self.player.unmute() {
            warn!(?error, "Unable to unmute player");
        }
        if let Err(error) = self.player.play() {
            warn!(?error, "Unable to resume player");
        }
        if let Err(error) = self.player.show_controls() {
            warn!(?error, "Unable to show player controls");
        }
    }

    fn remaining_seconds(&self) -> Result<Option<f64>, PlayerError> {
        if self.player.state()? != PlayerState::Playing {
            return Ok(None);
        }

        let duration = self.player.duration()?;
        if !duration.is_finite() || duration <= 0.0 {
            return Ok(None);
        }

        Ok(Some(duration - self.player.current_time()?))
    }

    fn cancel_timers(&mut self) {
        if let Some(handle) = self.end_timer.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.poll_timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}
