// Browser bindings: cookie jar, timeouts, the YouTube IFrame player and the
// page elements around it.
use crate::queue::{
    Direction, KeyValueStore, PlaybackController, Player, PlayerError, PlayerState, PlayerView,
    QueueEntry, Scheduler, SearchResult, StoreError, Surface, TimerEvent, TimerHandle,
    WatchedStore,
};
use crate::VideoId;
use gloo_timers::callback::Timeout;
use js_sys::{Array, Function, Object, Reflect};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlButtonElement, HtmlDocument, HtmlElement, HtmlIFrameElement};

const YOUTUBE_EMBED_URL: &str = "https://www.youtube.com/embed/";
const YOUTUBE_IFRAME_API_URL: &str = "https://www.youtube.com/iframe_api";
const YOUTUBE_API_SCRIPT_ID: &str = "youtube-iframe-api";
const IFRAME_ID: &str = "youtube-iframe";
const IFRAME_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";
const SHOW_CONTROLS_COMMAND: &str = r#"{"event":"command","func":"showControls","args":""}"#;
const AUTOPLAY_DELAY_MS: u32 = 1000;

thread_local! {
    static CONTROLLER: RefCell<Option<Rc<RefCell<PlaybackController>>>> = RefCell::new(None);
}

static LOGGER: ConsoleLogger = ConsoleLogger;

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&message),
            log::Level::Warn => web_sys::console::warn_1(&message),
            _ => web_sys::console::info_1(&message),
        }
    }

    fn flush(&self) {}
}

/// Late-bound handle to the controller for callbacks created before it.
#[derive(Clone, Default)]
struct ControllerLink(Rc<RefCell<Weak<RefCell<PlaybackController>>>>);

impl ControllerLink {
    fn attach(&self, controller: &Rc<RefCell<PlaybackController>>) {
        *self.0.borrow_mut() = Rc::downgrade(controller);
    }

    fn dispatch<F>(&self, action: F)
    where
        F: FnOnce(&mut PlaybackController) + 'static,
    {
        let Some(controller) = self.0.borrow().upgrade() else {
            return;
        };

        match controller.try_borrow_mut() {
            Ok(mut controller) => action(&mut controller),
            Err(_) => {
                // Controller is mid-transition; retry on the next tick.
                let link = self.clone();
                Timeout::new(0, move || link.dispatch(action)).forget();
            }
        };
    }
}

struct CookieJar {
    document: HtmlDocument,
}

impl KeyValueStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let cookies = self.document.cookie().ok()?;
        let prefix = format!("{}=", name);

        cookies
            .split(';')
            .map(str::trim_start)
            .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
            .map(str::to_string)
    }

    fn set(&mut self, name: &str, value: &str, max_age: Duration) -> Result<(), StoreError> {
        let cookie = format!("{}={};max-age={};path=/", name, value, max_age.as_secs());

        self.document
            .set_cookie(&cookie)
            .map_err(|error| StoreError::Unavailable(format!("{:?}", error)))
    }
}

struct TimeoutScheduler {
    link: ControllerLink,
    next_id: u64,
    timeouts: HashMap<TimerHandle, Timeout>,
    fired: Rc<RefCell<Vec<TimerHandle>>>,
}

impl TimeoutScheduler {
    fn new(link: ControllerLink) -> Self {
        Self {
            link,
            next_id: 0,
            timeouts: HashMap::new(),
            fired: Rc::new(RefCell::new(vec![])),
        }
    }

    // Fired timeouts report themselves after their callback returned, so
    // the one currently running is never dropped here.
    fn prune(&mut self) {
        for handle in self.fired.borrow_mut().drain(..) {
            self.timeouts.remove(&handle);
        }
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&mut self, delay: Duration, event: TimerEvent) -> TimerHandle {
        self.prune();
        self.next_id += 1;

        let handle = TimerHandle(self.next_id);
        let link = self.link.clone();
        let fired = Rc::clone(&self.fired);
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);

        let timeout = Timeout::new(millis, move || {
            link.dispatch(move |controller| controller.on_timer(handle, event));
            fired.borrow_mut().push(handle);
        });
        self.timeouts.insert(handle, timeout);

        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.prune();
        // dropping a gloo Timeout clears it
        self.timeouts.remove(&handle);
    }
}

struct PlayerCallbacks {
    on_ready: Closure<dyn FnMut(JsValue)>,
    on_state_change: Closure<dyn FnMut(JsValue)>,
    on_api_ready: Closure<dyn FnMut()>,
}

struct YouTubePlayer {
    document: Document,
    link: ControllerLink,
    instance: Rc<RefCell<Option<JsValue>>>,
    // Kept until the next bind so late events from a destroyed player never
    // hit a freed closure.
    callbacks: Option<PlayerCallbacks>,
}

impl YouTubePlayer {
    fn new(document: Document, link: ControllerLink) -> Self {
        Self {
            document,
            link,
            instance: Rc::new(RefCell::new(None)),
            callbacks: None,
        }
    }

    fn instance(&self) -> Result<JsValue, PlayerError> {
        self.instance.borrow().clone().ok_or(PlayerError::NotReady)
    }

    fn insert_iframe(&self, entry: &QueueEntry) -> Result<(), PlayerError> {
        let container = self
            .document
            .get_element_by_id("video-player")
            .ok_or_else(|| PlayerError::Call("#video-player is missing".into()))?;

        let iframe = self.document.create_element("iframe").map_err(js_error)?;
        let src = format!(
            "{}{}?autoplay=1&enablejsapi=1",
            YOUTUBE_EMBED_URL,
            urlencoding::encode(&entry.id)
        );
        iframe.set_id(IFRAME_ID);
        iframe.set_attribute("src", &src).map_err(js_error)?;
        iframe.set_attribute("allow", IFRAME_ALLOW).map_err(js_error)?;
        iframe.set_attribute("allowfullscreen", "").map_err(js_error)?;

        container.set_inner_html("");
        container.append_child(&iframe).map_err(js_error)?;

        Ok(())
    }

    fn ensure_api_script(&self) -> Result<(), PlayerError> {
        if self.document.get_element_by_id(YOUTUBE_API_SCRIPT_ID).is_some() {
            return Ok(());
        }

        let script = self.document.create_element("script").map_err(js_error)?;
        script.set_id(YOUTUBE_API_SCRIPT_ID);
        script
            .set_attribute("src", YOUTUBE_IFRAME_API_URL)
            .map_err(js_error)?;

        let body = self
            .document
            .body()
            .ok_or_else(|| PlayerError::Call("document has no body".into()))?;
        body.append_child(&script).map_err(js_error)?;

        Ok(())
    }

    fn callbacks(&self, options: &Object) -> PlayerCallbacks {
        let ready_link = self.link.clone();
        let on_ready = Closure::wrap(Box::new(move |_event: JsValue| {
            ready_link.dispatch(|controller| controller.on_player_ready());
        }) as Box<dyn FnMut(JsValue)>);

        let state_link = self.link.clone();
        let on_state_change = Closure::wrap(Box::new(move |event: JsValue| {
            let state = Reflect::get(&event, &JsValue::from_str("data"))
                .ok()
                .and_then(|data| data.as_f64());

            if let Some(state) = state {
                let state = PlayerState::from(state as i32);
                state_link.dispatch(move |controller| controller.on_player_state_change(state));
            }
        }) as Box<dyn FnMut(JsValue)>);

        let instance = Rc::clone(&self.instance);
        let options = options.clone();
        let on_api_ready = Closure::wrap(Box::new(move || {
            if let Err(error) = construct_player(&options, &instance) {
                log::warn!("Unable to initialize YouTube player: {}", error);
            }
        }) as Box<dyn FnMut()>);

        PlayerCallbacks {
            on_ready,
            on_state_change,
            on_api_ready,
        }
    }
}

impl Player for YouTubePlayer {
    fn bind(&mut self, entry: &QueueEntry) -> Result<(), PlayerError> {
        self.unbind();
        self.insert_iframe(entry)?;

        let events = Object::new();
        let options = Object::new();
        let callbacks = self.callbacks(&options);

        set_property(&events, "onReady", callbacks.on_ready.as_ref())?;
        set_property(&events, "onStateChange", callbacks.on_state_change.as_ref())?;
        set_property(&options, "events", &events)?;

        let window = web_sys::window().ok_or_else(|| PlayerError::Call("no window".into()))?;
        set_property(
            &window,
            "onYouTubeIframeAPIReady",
            callbacks.on_api_ready.as_ref(),
        )?;
        self.callbacks = Some(callbacks);

        if player_constructor().is_ok() {
            construct_player(&options, &self.instance)
        } else {
            self.ensure_api_script()
        }
    }

    fn unbind(&mut self) {
        if let Some(instance) = self.instance.borrow_mut().take() {
            if let Err(error) = call_method(&instance, "destroy") {
                log::debug!("Unable to destroy YouTube player: {}", error);
            }
        }

        if let Some(container) = self.document.get_element_by_id("video-player") {
            container.set_inner_html("");
        }
    }

    fn state(&self) -> Result<PlayerState, PlayerError> {
        let value = call_method(&self.instance()?, "getPlayerState")?;
        value
            .as_f64()
            .map(|state| PlayerState::from(state as i32))
            .ok_or(PlayerError::NotReady)
    }

    fn current_time(&self) -> Result<f64, PlayerError> {
        call_method(&self.instance()?, "getCurrentTime")?
            .as_f64()
            .ok_or(PlayerError::NotReady)
    }

    fn duration(&self) -> Result<f64, PlayerError> {
        call_method(&self.instance()?, "getDuration")?
            .as_f64()
            .ok_or(PlayerError::NotReady)
    }

    fn unmute(&mut self) -> Result<(), PlayerError> {
        call_method(&self.instance()?, "unMute").map(|_| ())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        call_method(&self.instance()?, "playVideo").map(|_| ())
    }

    fn show_controls(&mut self) -> Result<(), PlayerError> {
        let iframe = self
            .document
            .get_element_by_id(IFRAME_ID)
            .and_then(|element| element.dyn_into::<HtmlIFrameElement>().ok())
            .ok_or(PlayerError::NotBound)?;
        let frame = iframe.content_window().ok_or(PlayerError::NotReady)?;

        frame
            .post_message(&JsValue::from_str(SHOW_CONTROLS_COMMAND), "*")
            .map_err(js_error)
    }
}

fn js_error(value: JsValue) -> PlayerError {
    PlayerError::Call(format!("{:?}", value))
}

fn set_property(target: &JsValue, key: &str, value: &JsValue) -> Result<(), PlayerError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_error)
}

fn call_method(target: &JsValue, name: &str) -> Result<JsValue, PlayerError> {
    let method = Reflect::get(target, &JsValue::from_str(name))
        .map_err(js_error)?
        .dyn_into::<Function>()
        .map_err(|_| PlayerError::NotReady)?;

    method.call0(target).map_err(js_error)
}

fn player_constructor() -> Result<Function, PlayerError> {
    let window = web_sys::window().ok_or(PlayerError::NotReady)?;
    let yt = Reflect::get(&window, &JsValue::from_str("YT")).map_err(js_error)?;
    if yt.is_undefined() || yt.is_null() {
        return Err(PlayerError::NotReady);
    }

    Reflect::get(&yt, &JsValue::from_str("Player"))
        .map_err(js_error)?
        .dyn_into::<Function>()
        .map_err(|_| PlayerError::NotReady)
}

fn construct_player(
    options: &Object,
    instance: &Rc<RefCell<Option<JsValue>>>,
) -> Result<(), PlayerError> {
    let constructor = player_constructor()?;
    let arguments = Array::of2(&JsValue::from_str(IFRAME_ID), options);
    let player = Reflect::construct(&constructor, &arguments).map_err(js_error)?;

    instance.borrow_mut().replace(player);

    Ok(())
}

struct DomSurface {
    document: Document,
}

impl DomSurface {
    fn html_element(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    fn set_display(&self, id: &str, display: &str) {
        if let Some(element) = self.html_element(id) {
            let _ = element.style().set_property("display", display);
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(element) = self.document.get_element_by_id(id) {
            element.set_text_content(Some(text));
        }
    }

    fn set_disabled(&self, id: &str, disabled: bool) {
        if let Some(button) = self
            .document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok())
        {
            button.set_disabled(disabled);
        }
    }

    fn set_body_overflow(&self, overflow: &str) {
        if let Some(body) = self.document.body() {
            let _ = body.style().set_property("overflow", overflow);
        }
    }

    fn for_each(&self, selector: &str, mut action: impl FnMut(&Element)) {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return;
        };

        for i in 0..nodes.length() {
            if let Some(element) = nodes
                .item(i)
                .and_then(|node| node.dyn_into::<Element>().ok())
            {
                action(&element);
            }
        }
    }

    fn clear_highlight(&self) {
        self.for_each(".video-item.current-playing", |element| {
            let _ = element.class_list().remove_1("current-playing");
        });
    }
}

impl Surface for DomSurface {
    fn show(&mut self, view: &PlayerView<'_>) {
        self.set_text("video-title", &view.entry.title);
        self.set_text("video-description", &view.entry.description);
        self.set_text("video-counter", &view.counter_text());
        self.set_display("video-counter", "block");

        self.set_disabled("prev-video-button", !view.previous_enabled());
        self.set_disabled("next-video-button", !view.next_enabled());
        self.set_display("player-controls", "flex");

        self.clear_highlight();
        self.for_each(
            &format!(r#".video-item[data-index="{}"]"#, view.index),
            |element| {
                let _ = element.class_list().add_1("current-playing");
            },
        );

        self.set_display("video-modal", "block");
        self.set_body_overflow("hidden");
    }

    fn hide(&mut self) {
        self.set_display("video-modal", "none");
        self.set_display("video-counter", "none");
        self.set_display("player-controls", "none");
        self.set_body_overflow("auto");
        self.clear_highlight();
    }

    fn mark_watched(&mut self, id: &VideoId) {
        self.for_each(
            &format!(r#".video-item[data-video-id="{}"]"#, id),
            |element| {
                let _ = element.class_list().add_1("watched");
            },
        );
    }
}

fn read_embedded_results(document: &Document) -> Vec<SearchResult> {
    let Some(raw) = document
        .get_element_by_id("video-data")
        .and_then(|element| element.text_content())
    else {
        log::warn!("Embedded video data is missing");
        return vec![];
    };

    match serde_json::from_str(&raw) {
        Ok(results) => results,
        Err(error) => {
            log::warn!("Unable to parse embedded video data: {}", error);
            vec![]
        }
    }
}

fn on_click<F>(document: &Document, id: &str, link: &ControllerLink, action: F)
where
    F: Fn(&mut PlaybackController) + 'static,
{
    let Some(element) = document.get_element_by_id(id) else {
        log::debug!("#{} is not on the page", id);
        return;
    };

    let link = link.clone();
    let action = Rc::new(action);
    let callback = Closure::wrap(Box::new(move |_event: Event| {
        let action = Rc::clone(&action);
        link.dispatch(move |controller| action(controller));
    }) as Box<dyn FnMut(Event)>);

    let _ = element.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
    callback.forget();
}

fn on_backdrop_click(document: &Document, link: &ControllerLink) {
    let Some(modal) = document.get_element_by_id("video-modal") else {
        return;
    };

    let link = link.clone();
    let callback = Closure::wrap(Box::new(move |event: Event| {
        let on_backdrop = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .map(|target| target.id() == "video-modal")
            .unwrap_or(false);

        if on_backdrop {
            link.dispatch(|controller| controller.close());
        }
    }) as Box<dyn FnMut(Event)>);

    let _ = modal.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
    callback.forget();
}

fn on_item_clicks(document: &Document, link: &ControllerLink) {
    let Ok(items) = document.query_selector_all(".video-item[data-index]") else {
        return;
    };

    for i in 0..items.length() {
        let Some(item) = items
            .item(i)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let Some(index) = item
            .get_attribute("data-index")
            .and_then(|value| value.parse::<usize>().ok())
        else {
            continue;
        };

        let link = link.clone();
        let callback = Closure::wrap(Box::new(move |_event: Event| {
            link.dispatch(move |controller| controller.select_at(index));
        }) as Box<dyn FnMut(Event)>);

        let _ = item.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }
}

/// Entry point called by the generated page once the package is loaded.
#[wasm_bindgen]
pub fn mount(autoplay: bool) -> Result<(), JsValue> {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document is not available"))?;
    let html_document = document
        .clone()
        .dyn_into::<HtmlDocument>()
        .map_err(JsValue::from)?;

    let results = read_embedded_results(&document);
    let link = ControllerLink::default();

    let controller = Rc::new(RefCell::new(PlaybackController::new(
        results,
        WatchedStore::new(Box::new(CookieJar {
            document: html_document,
        })),
        Box::new(YouTubePlayer::new(document.clone(), link.clone())),
        Box::new(TimeoutScheduler::new(link.clone())),
        Box::new(DomSurface {
            document: document.clone(),
        }),
    )));
    link.attach(&controller);

    on_click(&document, "play-all-button", &link, |controller| controller.start());
    on_click(&document, "prev-video-button", &link, |controller| {
        controller.advance(Direction::Previous)
    });
    on_click(&document, "next-video-button", &link, |controller| {
        controller.advance(Direction::Next)
    });
    on_click(&document, "close-button", &link, |controller| controller.close());
    on_backdrop_click(&document, &link);
    on_item_clicks(&document, &link);

    if autoplay {
        let link = link.clone();
        Timeout::new(AUTOPLAY_DELAY_MS, move || {
            link.dispatch(|controller| controller.start())
        })
        .forget();
    }

    CONTROLLER.with(|slot| slot.borrow_mut().replace(controller));

    Ok(())
}
