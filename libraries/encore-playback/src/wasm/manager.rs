//! WASM-compatible PlaybackEngine wrapper

use super::binding::{EventInbox, HtmlMediaBinding};
use crate::{PlaybackCommand, PlaybackConfig, PlaybackEngine, PlaybackError, PlaybackEvent};
use encore_core::{AdDescriptor, StaticAdCatalog, Track};
use gloo_timers::callback::Timeout;
use js_sys::Function;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

type Engine = PlaybackEngine<HtmlMediaBinding>;

struct Shared {
    engine: RefCell<Engine>,
    host: RefCell<HostState>,
    inbox: EventInbox,
}

#[derive(Default)]
struct HostState {
    on_event: Option<Function>,
    // Dropping the timeout clears it
    ad_timeout: Option<Timeout>,
}

/// WASM-compatible playback engine
///
/// Owns an engine bound to an `<audio>` element. Media callbacks, play
/// promise settlements and ad timers are fed back into the engine here;
/// every resulting `PlaybackEvent` is passed to the `onEvent` callback as a
/// plain JS object.
#[wasm_bindgen]
pub struct WasmPlaybackEngine {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl WasmPlaybackEngine {
    /// Create an engine driving `element`
    ///
    /// `ads` is an array of ad descriptors; `config` may be `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        element: HtmlAudioElement,
        ads: JsValue,
        config: JsValue,
    ) -> Result<WasmPlaybackEngine, JsValue> {
        console_error_panic_hook::set_once();

        let ads: Vec<AdDescriptor> = serde_wasm_bindgen::from_value(ads)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse ads: {}", e)))?;
        let config: PlaybackConfig = if config.is_undefined() || config.is_null() {
            PlaybackConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };

        let catalog = StaticAdCatalog::new(ads).map_err(|e| to_js(e.into()))?;
        let inbox = EventInbox::default();
        let binding = HtmlMediaBinding::new(element, inbox.clone())?;
        let engine = PlaybackEngine::new(config, binding, catalog).map_err(to_js)?;

        let shared = Rc::new(Shared {
            engine: RefCell::new(engine),
            host: RefCell::new(HostState::default()),
            inbox,
        });

        let weak = Rc::downgrade(&shared);
        shared.inbox.set_wake(Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                pump(&shared);
            }
        }));

        Ok(Self { shared })
    }

    /// Register the event callback
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Function) {
        self.shared.host.borrow_mut().on_event = Some(callback);
    }

    /// Replace the queue with an array of tracks
    #[wasm_bindgen(js_name = setTracks)]
    pub fn set_tracks(&self, tracks: JsValue) -> Result<(), JsValue> {
        let tracks: Vec<Track> = serde_wasm_bindgen::from_value(tracks)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {}", e)))?;
        self.with_engine(|engine| engine.set_tracks(tracks));
        Ok(())
    }

    /// Apply a command object, e.g. `{ type: "select_track", index: 2 }`
    pub fn dispatch(&self, command: JsValue) -> Result<(), JsValue> {
        let command: PlaybackCommand = serde_wasm_bindgen::from_value(command)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse command: {}", e)))?;
        self.with_engine(|engine| engine.dispatch(command)).map_err(to_js)
    }

    // ===== Playback Control =====

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) {
        self.with_engine(|engine| engine.toggle_play());
    }

    #[wasm_bindgen(js_name = playNextTrack)]
    pub fn play_next_track(&self) {
        self.with_engine(|engine| engine.play_next_track());
    }

    #[wasm_bindgen(js_name = playPreviousTrack)]
    pub fn play_previous_track(&self) {
        self.with_engine(|engine| engine.play_previous_track());
    }

    #[wasm_bindgen(js_name = handleTrackSelect)]
    pub fn handle_track_select(&self, index: usize) -> Result<(), JsValue> {
        self.with_engine(|engine| engine.handle_track_select(index))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = handleStop)]
    pub fn handle_stop(&self) {
        self.with_engine(|engine| engine.handle_stop());
    }

    /// Seek to position in seconds
    #[wasm_bindgen(js_name = handleProgressChange)]
    pub fn handle_progress_change(&self, seconds: f64) -> Result<(), JsValue> {
        self.with_engine(|engine| engine.handle_progress_change(seconds))
            .map_err(to_js)
    }

    // ===== Volume / Modes =====

    /// Set volume (0.0-1.0)
    #[wasm_bindgen(js_name = handleVolumeChange)]
    pub fn handle_volume_change(&self, volume: f64) {
        self.with_engine(|engine| engine.handle_volume_change(volume));
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.with_engine(|engine| engine.toggle_mute());
    }

    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&self) {
        self.with_engine(|engine| engine.toggle_shuffle());
    }

    #[wasm_bindgen(js_name = toggleRepeat)]
    pub fn toggle_repeat(&self) {
        self.with_engine(|engine| engine.toggle_repeat());
    }

    // ===== Advertisements =====

    #[wasm_bindgen(js_name = showAdvertisement)]
    pub fn show_advertisement(&self) {
        self.with_engine(|engine| engine.show_advertisement());
    }

    #[wasm_bindgen(js_name = closeAdvertisement)]
    pub fn close_advertisement(&self) {
        self.with_engine(|engine| engine.close_advertisement());
    }

    // ===== State Queries =====

    /// Current session state as a plain object
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.shared.engine.borrow().snapshot();
        serde_wasm_bindgen::to_value(&snapshot).map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.shared.engine.borrow().is_playing()
    }

    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> Option<usize> {
        self.shared.engine.borrow().current_index()
    }

    fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        let result = f(&mut self.shared.engine.borrow_mut());
        pump(&self.shared);
        result
    }
}

impl Drop for WasmPlaybackEngine {
    fn drop(&mut self) {
        self.shared.inbox.clear_wake();
        self.shared.host.borrow_mut().ad_timeout.take();
        if let Ok(mut engine) = self.shared.engine.try_borrow_mut() {
            engine.shutdown();
        }
    }
}

/// Feed queued media callbacks into the engine and deliver its events
///
/// Returns early when the engine is already borrowed; the outer caller
/// drains whatever is left.
fn pump(shared: &Rc<Shared>) {
    loop {
        let events = {
            let Ok(mut engine) = shared.engine.try_borrow_mut() else {
                return;
            };
            for event in shared.inbox.drain() {
                engine.handle_media_event(event);
            }
            engine.drain_events()
        };

        if events.is_empty() && shared.inbox.is_empty() {
            return;
        }
        for event in events {
            deliver(shared, event);
        }
    }
}

fn deliver(shared: &Rc<Shared>, event: PlaybackEvent) {
    match &event {
        PlaybackEvent::AdTimerArmed { token, delay_ms } => {
            let token = *token;
            let weak: Weak<Shared> = Rc::downgrade(shared);
            let delay = u32::try_from(*delay_ms).unwrap_or(u32::MAX);
            let timeout = Timeout::new(delay, move || {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                if let Ok(mut engine) = shared.engine.try_borrow_mut() {
                    engine.handle_ad_timeout(token);
                }
                pump(&shared);
            });
            shared.host.borrow_mut().ad_timeout = Some(timeout);
        }
        PlaybackEvent::AdTimerCancelled => {
            shared.host.borrow_mut().ad_timeout.take();
        }
        _ => {}
    }

    let callback = shared.host.borrow().on_event.clone();
    if let Some(callback) = callback {
        match serde_wasm_bindgen::to_value(&event) {
            Ok(value) => {
                let _ = callback.call1(&JsValue::NULL, &value);
            }
            Err(e) => tracing::warn!("Failed to serialize playback event: {}", e),
        }
    }
}

fn to_js(err: PlaybackError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
