use super::{
    ControllerState, Direction, KeyValueStore, PlaybackController, Player, PlayerError,
    PlayerState, PlayerView, QueueEntry, Scheduler, SearchResult, StoreError, Surface,
    TimerEvent, TimerHandle, WatchedStore,
};
use crate::VideoId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Default)]
struct CookieJarMock {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl KeyValueStore for CookieJarMock {
    fn get(&self, name: &str) -> Option<String> {
        self.values.borrow().get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str, _max_age: Duration) -> Result<(), StoreError> {
        self.values
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct Timers {
    next_id: u64,
    now: Duration,
    pending: Vec<(TimerHandle, Duration, TimerEvent)>,
}

#[derive(Clone, Default)]
struct SchedulerMock {
    timers: Rc<RefCell<Timers>>,
}

impl Scheduler for SchedulerMock {
    fn schedule(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let mut timers = self.timers.borrow_mut();
        timers.next_id += 1;
        let handle = TimerHandle(timers.next_id);
        let due = timers.now + delay;
        timers.pending.push((handle, due, event));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers
            .borrow_mut()
            .pending
            .retain(|(pending, _, _)| *pending != handle);
    }
}

impl SchedulerMock {
    fn pending_events(&self) -> Vec<TimerEvent> {
        self.timers
            .borrow()
            .pending
            .iter()
            .map(|(_, _, event)| *event)
            .collect()
    }

    fn pending_count(&self, event: TimerEvent) -> usize {
        self.pending_events().into_iter().filter(|e| *e == event).count()
    }

    /// Moves the clock forward, firing due timers in order.
    fn advance_time(&self, controller: &mut PlaybackController, by: Duration) {
        let target = self.timers.borrow().now + by;

        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due_position = timers
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, due, _))| *due <= target)
                    .min_by_key(|(_, (handle, due, _))| (*due, handle.0))
                    .map(|(position, _)| position);

                due_position.map(|position| {
                    let (handle, due, event) = timers.pending.remove(position);
                    timers.now = due;
                    (handle, event)
                })
            };

            match next {
                Some((handle, event)) => controller.on_timer(handle, event),
                None => break,
            }
        }

        self.timers.borrow_mut().now = target;
    }
}

#[derive(Default)]
struct PlayerLog {
    bound: Option<VideoId>,
    binds: Vec<VideoId>,
    unbinds: usize,
    state: i32,
    current_time: f64,
    duration: f64,
    unmutes: usize,
    plays: usize,
    show_controls: usize,
    failing: bool,
    failing_instructions: bool,
}

#[derive(Clone, Default)]
struct PlayerMock {
    log: Rc<RefCell<PlayerLog>>,
}

impl PlayerMock {
    fn failure(&self) -> Result<(), PlayerError> {
        if self.log.borrow().failing {
            Err(PlayerError::Call("player iframe is gone".into()))
        } else {
            Ok(())
        }
    }

    fn instruction_failure(&self) -> Result<(), PlayerError> {
        let log = self.log.borrow();
        if log.failing || log.failing_instructions {
            Err(PlayerError::Call("postMessage was rejected".into()))
        } else {
            Ok(())
        }
    }

    fn set_position(&self, state: i32, current_time: f64, duration: f64) {
        let mut log = self.log.borrow_mut();
        log.state = state;
        log.current_time = current_time;
        log.duration = duration;
    }
}

impl Player for PlayerMock {
    fn bind(&mut self, entry: &QueueEntry) -> Result<(), PlayerError> {
        self.failure()?;
        let mut log = self.log.borrow_mut();
        log.bound = Some(entry.id.clone());
        log.binds.push(entry.id.clone());
        Ok(())
    }

    fn unbind(&mut self) {
        let mut log = self.log.borrow_mut();
        log.bound = None;
        log.unbinds += 1;
    }

    fn state(&self) -> Result<PlayerState, PlayerError> {
        self.failure()?;
        Ok(self.log.borrow().state.into())
    }

    fn current_time(&self) -> Result<f64, PlayerError> {
        self.failure()?;
        Ok(self.log.borrow().current_time)
    }

    fn duration(&self) -> Result<f64, PlayerError> {
        self.failure()?;
        Ok(self.log.borrow().duration)
    }

    fn unmute(&mut self) -> Result<(), PlayerError> {
        self.log.borrow_mut().unmutes += 1;
        self.instruction_failure()
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.log.borrow_mut().plays += 1;
        self.instruction_failure()
    }

    fn show_controls(&mut self) -> Result<(), PlayerError> {
        self.log.borrow_mut().show_controls += 1;
        self.instruction_failure()
    }
}

#[derive(Default)]
struct SurfaceLog {
    visible: bool,
    title: String,
    counter: String,
    previous_enabled: bool,
    next_enabled: bool,
    watched: Vec<VideoId>,
}

#[derive(Clone, Default)]
struct SurfaceMock {
    log: Rc<RefCell<SurfaceLog>>,
}

impl Surface for SurfaceMock {
    fn show(&mut self, view: &PlayerView<'_>) {
        let mut log = self.log.borrow_mut();
        log.visible = true;
        log.title = view.entry.title.clone();
        log.counter = view.counter_text();
        log.previous_enabled = view.previous_enabled();
        log.next_enabled = view.next_enabled();
    }

    fn hide(&mut self) {
        self.log.borrow_mut().visible = false;
    }

    fn mark_watched(&mut self, id: &VideoId) {
        self.log.borrow_mut().watched.push(id.clone());
    }
}

struct Fixture {
    controller: PlaybackController,
    jar: CookieJarMock,
    scheduler: SchedulerMock,
    player: PlayerMock,
    surface: SurfaceMock,
}

fn result(id: &str) -> SearchResult {
    SearchResult {
        id: id.into(),
        title: format!("Funny dog {}", id),
        description: format!("Dog {} does something", id),
        thumbnail_url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
        published_at: "2025-03-01T10:00:00Z".into(),
    }
}

fn fixture_with_jar(ids: &[&str], jar: CookieJarMock) -> Fixture {
    let scheduler = SchedulerMock::default();
    let player = PlayerMock::default();
    let surface = SurfaceMock::default();
    let controller = PlaybackController::new(
        ids.iter().map(|id| result(id)).collect(),
        WatchedStore::new(Box::new(jar.clone())),
        Box::new(player.clone()),
        Box::new(scheduler.clone()),
        Box::new(surface.clone()),
    );

    Fixture {
        controller,
        jar,
        scheduler,
        player,
        surface,
    }
}

fn fixture(ids: &[&str]) -> Fixture {
    fixture_with_jar(ids, CookieJarMock::default())
}

fn reload_watched(jar: &CookieJarMock) -> Vec<String> {
    WatchedStore::new(Box::new(jar.clone()))
        .load()
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

const END_DELAY: Duration = Duration::from_secs(1);
const POLL: Duration = Duration::from_millis(200);

#[test]
fn test_start_on_empty_queue_stays_idle() {
    let mut f = fixture(&[]);

    f.controller.start();

    assert_eq!(f.controller.state(), ControllerState::Idle);
    assert!(!f.controller.is_queue_mode_active());
    assert!(!f.controller.has_pending_timers());
    assert!(f.player.log.borrow().binds.is_empty());
    assert!(!f.surface.log.borrow().visible);
}

#[test]
fn test_start_plays_first_entry_and_marks_it_watched() {
    let mut f = fixture(&["A", "B", "C"]);

    f.controller.start();

    assert_eq!(f.controller.state(), ControllerState::Playing(0));
    assert_eq!(f.controller.current_index(), Some(0));
    assert!(f.controller.is_watched(&"A".into()));
    assert_eq!(reload_watched(&f.jar), vec!["A"]);
    assert_eq!(f.player.log.borrow().bound, Some("A".into()));

    let surface = f.surface.log.borrow();
    assert!(surface.visible);
    assert_eq!(surface.title, "Funny dog A");
    assert_eq!(surface.counter, "Video 1 of 3");
    assert!(!surface.previous_enabled);
    assert!(surface.next_enabled);
}

#[test]
fn test_ended_events_walk_through_the_queue_and_close_at_the_end() {
    let mut f = fixture(&["A", "B", "C"]);

    f.controller.start();
    f.controller.on_player_state_change(PlayerState::Ended);

    f.scheduler
        .advance_time(&mut f.controller, Duration::from_millis(999));
    assert_eq!(f.controller.state(), ControllerState::Playing(0));

    f.scheduler
        .advance_time(&mut f.controller, Duration::from_millis(1));
    assert_eq!(f.controller.state(), ControllerState::Playing(1));
    assert!(f.controller.is_watched(&"B".into()));

    f.controller.on_player_state_change(PlayerState::Ended);
    f.scheduler.advance_time(&mut f.controller, END_DELAY);
    assert_eq!(f.controller.state(), ControllerState::Playing(2));
    {
        let surface = f.surface.log.borrow();
        assert!(surface.previous_enabled);
        assert!(!surface.next_enabled);
    }

    f.controller.on_player_state_change(PlayerState::Ended);
    f.scheduler.advance_time(&mut f.controller, END_DELAY);

    assert_eq!(f.controller.state(), ControllerState::Idle);
    assert!(!f.controller.has_pending_timers());
    assert!(f.scheduler.pending_events().is_empty());
    assert!(!f.surface.log.borrow().visible);
    assert_eq!(f.player.log.borrow().bound, None);
    assert_eq!(reload_watched(&f.jar), vec!["A", "B", "C"]);
}

#[test]
fn test_non_ended_state_changes_are_ignored() {
    let mut f = fixture(&["A", "B"]);

    f.controller.start();
    f.controller.on_player_state_change(PlayerState::Paused);
    f.controller.on_player_state_change(PlayerState::from(3));

    assert!(f.scheduler.pending_events().is_empty());
}

#[test]
fn test_ended_event_while_idle_is_ignored() {
    let mut f = fixture(&["A", "B"]);

    f.controller.on_player_state_change(PlayerState::Ended);

    assert!(f.scheduler.pending_events().is_empty());
    assert_eq!(f.controller.state(), ControllerState::Idle);
}

#[test]
fn test_advance_is_a_no_op_at_the_edges() {
    let mut f = fixture(&["A", "B", "C"]);

    f.controller.start();
    f.controller.advance(Direction::Previous);
    assert_eq!(f.controller.state(), ControllerState::Playing(0));

    f.controller.advance(Direction::Next);
    f.controller.advance(Direction::Next);
    assert_eq!(f.controller.state(), ControllerState::Playing(2));

    f.controller.advance(Direction::Next);
    assert_eq!(f.controller.state(), ControllerState::Playing(2));
    assert_eq!(f.player.log.borrow().binds.len(), 3);

    f.controller.advance(Direction::Previous);
    assert_eq!(f.controller.state(), ControllerState::Playing(1));
}

#[test]
fn test_advance_while_idle_does_nothing() {
    let mut f = fixture(&["A", "B"]);

    f.controller.advance(Direction::Next);

    assert_eq!(f.controller.state(), ControllerState::Idle);
    assert!(f.player.log.borrow().binds.is_empty());
}

#[test]
fn test_single_entry_queue_disables_both_controls() {
    let mut f = fixture(&["A"]);

    f.controller.start();

    let surface = f.surface.log.borrow();
    assert!(!surface.previous_enabled);
    assert!(!surface.next_enabled);
}

#[test]
fn test_select_at_marks_entry_watched_and_survives_reload() {
    let mut f = fixture(&["A", "B", "C"]);

    f.controller.select_at(2);

    assert_eq!(f.controller.state(), ControllerState::Playing(2));
    assert!(f.controller.is_watched(&"C".into()));
    assert_eq!(reload_watched(&f.jar), vec!["C"]);

    f.controller.advance(Direction::Previous);
    assert_eq!(reload_watched(&f.jar), vec!["B", "C"]);
}

#[test]
fn test_select_at_out_of_range_stays_idle() {
    let mut f = fixture(&["A", "B"]);

    f.controller.select_at(2);

    assert_eq!(f.controller.state(), ControllerState::Idle);
    assert!(f.player.log.borrow().binds.is_empty());
}

#[test]
fn test_double_close_is_idempotent() {
    let mut f = fixture(&["A", "B"]);

    f.controller.start();
    f.controller.on_player_ready();
    f.controller.on_player_state_change(PlayerState::Ended);
    assert!(f.controller.has_pending_timers());

    f.controller.close();
    f.controller.close();

    assert_eq!(f.controller.state(), ControllerState::Idle);
    assert!(!f.controller.has_pending_timers());
    assert!(f.scheduler.pending_events().is_empty());

    f.scheduler
        .advance_time(&mut f.controller, Duration::from_secs(5));
    assert_eq!(f.controller.state(), ControllerState::Idle);
    assert_eq!(f.player.log.borrow().binds.len(), 1);
}

#[test]
fn test_close_while_idle_is_harmless() {
    let mut f = fixture(&["A"]);

    f.controller.close();

    assert_eq!(f.controller.state(), ControllerState::Idle);
    assert!(f.scheduler.pending_events().is_empty());
}

#[test]
fn test_manual_advance_cancels_pending_auto_advance() {
    let mut f = fixture(&["A", "B", "C"]);

    f.controller.start();
    f.controller.on_player_state_change(PlayerState::Ended);
    f.controller.advance(Direction::Next);

    assert_eq!(f.controller.state(), ControllerState::Playing(1));
    assert!(f.scheduler.pending_events().is_empty());

    f.scheduler.advance_time(&mut f.controller, END_DELAY * 3);
    assert_eq!(f.controller.state(), ControllerState::Playing(1));
}

#[test]
fn test_repeated_ended_events_keep_a_single_end_timer() {
    let mut f = fixture(&["A", "B", "C"]);

    f.controller.start();
    f.controller.on_player_state_change(PlayerState::Ended);
    f.controller.on_player_state_change(PlayerState::Ended);

    assert_eq!(f.scheduler.pending_count(TimerEvent::Advance), 1);

    f.scheduler.advance_time(&mut f.controller, END_DELAY);
    assert_eq!(f.controller.state(), ControllerState::Playing(1));
}

#[test]
fn test_stale_timer_is_ignored() {
    let mut f = fixture(&["A", "B", "C"]);

    f.controller.start();
    f.controller.on_timer(TimerHandle(999), TimerEvent::Advance);
    f.controller.on_timer(TimerHandle(999), TimerEvent::Close);

    assert_eq!(f.controller.state(), ControllerState::Playing(0));
}

#[test]
fn test_restored_watched_ids_are_marked_on_construction() {
    let jar = CookieJarMock::default();
    {
        let mut f = fixture_with_jar(&["A", "B", "C"], jar.clone());
        f.controller.select_at(1);
    }

    let f = fixture_with_jar(&["A", "B", "C"], jar);

    assert!(f.controller.is_watched(&"B".into()));
    assert_eq!(f.controller.state(), ControllerState::Idle);
    assert_eq!(f.surface.log.borrow().watched, vec![VideoId::from("B")]);
}

#[test]
fn test_malformed_persisted_value_starts_with_empty_watched_set() {
    let jar = CookieJarMock::default();
    jar.values
        .borrow_mut()
        .insert("doggyHitsWatched".into(), "{not json".into());

    let mut f = fixture_with_jar(&["A"], jar);
    assert!(f.controller.watched_ids().is_empty());

    f.controller.start();
    assert_eq!(reload_watched(&f.jar), vec!["A"]);
}

#[test]
fn test_near_end_instructs_player_once_per_crossing() {
    let mut f = fixture(&["A", "B"]);

    f.controller.start();
    f.controller.on_player_ready();
    f.player.set_position(1, 30.0, 60.0);

    f.scheduler.advance_time(&mut f.controller, POLL);
    assert_eq!(f.player.log.borrow().unmutes, 0);

    f.player.set_position(1, 58.5, 60.0);
    f.scheduler.advance_time(&mut f.controller, POLL * 5);

    {
        let log = f.player.log.borrow();
        assert_eq!(log.unmutes, 1);
        assert_eq!(log.plays, 1);
        assert_eq!(log.show_controls, 1);
    }
    assert_eq!(f.scheduler.pending_count(TimerEvent::NearEndPoll), 1);
    assert_eq!(f.controller.state(), ControllerState::Playing(0));

    // seek back, then cross the threshold again
    f.player.set_position(1, 40.0, 60.0);
    f.scheduler.advance_time(&mut f.controller, POLL);
    f.player.set_position(1, 59.0, 60.0);
    f.scheduler.advance_time(&mut f.controller, POLL);

    assert_eq!(f.player.log.borrow().unmutes, 2);
}

#[test]
fn test_near_end_ignores_paused_player_and_finished_video() {
    let mut f = fixture(&["A", "B"]);

    f.controller.start();
    f.controller.on_player_ready();

    f.player.set_position(2, 59.0, 60.0);
    f.scheduler.advance_time(&mut f.controller, POLL);
    f.player.set_position(1, 60.0, 60.0);
    f.scheduler.advance_time(&mut f.controller, POLL);

    assert_eq!(f.player.log.borrow().unmutes, 0);
}

#[test]
fn test_player_ready_twice_keeps_a_single_poll_chain() {
    let mut f = fixture(&["A", "B"]);

    f.controller.start();
    f.controller.on_player_ready();
    f.controller.on_player_ready();

    assert_eq!(f.scheduler.pending_count(TimerEvent::NearEndPoll), 1);

    f.scheduler.advance_time(&mut f.controller, POLL * 10);
    assert_eq!(f.scheduler.pending_count(TimerEvent::NearEndPoll), 1);
}

#[test]
fn test_player_ready_while_idle_does_not_poll() {
    let mut f = fixture(&["A"]);

    f.controller.on_player_ready();

    assert!(f.scheduler.pending_events().is_empty());
}

#[test]
fn test_transition_stops_previous_poll_chain() {
    let mut f = fixture(&["A", "B"]);

    f.controller.start();
    f.controller.on_player_ready();
    f.controller.advance(Direction::Next);

    assert_eq!(f.scheduler.pending_count(TimerEvent::NearEndPoll), 0);
}

#[test]
fn test_player_failures_never_block_advancement() {
    let mut f = fixture(&["A", "B", "C"]);
    f.player.log.borrow_mut().failing = true;

    f.controller.start();
    assert_eq!(f.controller.state(), ControllerState::Playing(0));
    assert!(f.controller.is_watched(&"A".into()));

    f.controller.on_player_ready();
    f.scheduler.advance_time(&mut f.controller, POLL * 3);

    f.controller.on_player_state_change(PlayerState::Ended);
    f.scheduler.advance_time(&mut f.controller, END_DELAY);

    assert_eq!(f.controller.state(), ControllerState::Playing(1));
    assert_eq!(reload_watched(&f.jar), vec!["A", "B"]);
}

#[test]
fn test_near_end_instruction_failures_do_not_interrupt_playback() {
    let mut f = fixture(&["A", "B"]);
    f.player.log.borrow_mut().failing_instructions = true;

    f.controller.start();
    f.controller.on_player_ready();
    f.player.set_position(1, 58.5, 60.0);
    f.scheduler.advance_time(&mut f.controller, POLL);
    assert_eq!(f.player.log.borrow().unmutes, 1);

    f.controller.on_player_state_change(PlayerState::Ended);
    f.scheduler.advance_time(&mut f.controller, END_DELAY);

    assert_eq!(f.controller.state(), ControllerState::Playing(1));
}
