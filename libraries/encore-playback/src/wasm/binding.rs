//! `MediaBinding` over an `<audio>` element

use crate::{MediaBinding, MediaEvent, PlayRequestId};
use encore_core::Track;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAudioElement;

/// Queue of media callbacks waiting to be fed into the engine
///
/// DOM listeners and play promises push here. The wake hook lets the owner
/// drain the queue as soon as something arrives; events pushed while the
/// engine is busy simply wait for the next drain.
#[derive(Clone, Default)]
pub struct EventInbox {
    queue: Rc<RefCell<VecDeque<MediaEvent>>>,
    wake: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
}

impl EventInbox {
    /// Queue an event and wake the owner
    pub fn push(&self, event: MediaEvent) {
        self.queue.borrow_mut().push_back(event);
        let wake = self.wake.borrow().clone();
        if let Some(wake) = wake {
            wake();
        }
    }

    /// Take all queued events
    pub fn drain(&self) -> Vec<MediaEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Install the wake hook
    pub fn set_wake(&self, wake: Rc<dyn Fn()>) {
        *self.wake.borrow_mut() = Some(wake);
    }

    /// Remove the wake hook
    pub fn clear_wake(&self) {
        self.wake.borrow_mut().take();
    }
}

/// Browser media element driven by the engine
pub struct HtmlMediaBinding {
    element: HtmlAudioElement,
    inbox: EventInbox,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
}

impl HtmlMediaBinding {
    /// Attach lifecycle listeners to `element`
    pub fn new(element: HtmlAudioElement, inbox: EventInbox) -> Result<Self, JsValue> {
        let mut binding = Self {
            element,
            inbox,
            listeners: Vec::new(),
        };

        binding.listen("timeupdate", || Some(MediaEvent::TimeUpdate))?;
        binding.listen("loadedmetadata", || Some(MediaEvent::LoadedMetadata))?;
        binding.listen("ended", || Some(MediaEvent::Ended))?;

        let element = binding.element.clone();
        binding.listen("error", move || {
            let code = element.error().map(|e| e.code()).unwrap_or(0);
            Some(MediaEvent::Error { code })
        })?;

        Ok(binding)
    }

    fn listen(
        &mut self,
        name: &'static str,
        make: impl Fn() -> Option<MediaEvent> + 'static,
    ) -> Result<(), JsValue> {
        let inbox = self.inbox.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(event) = make() {
                inbox.push(event);
            }
        });
        self.element
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        self.listeners.push((name, closure));
        Ok(())
    }
}

impl Drop for HtmlMediaBinding {
    fn drop(&mut self) {
        let _ = self.element.pause();
        for (name, closure) in self.listeners.drain(..) {
            let _ = self
                .element
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

impl MediaBinding for HtmlMediaBinding {
    fn load(&mut self, track: &Track) {
        self.element.set_src(&track.url);
        self.element.load();
    }

    fn play(&mut self, request: PlayRequestId) {
        let inbox = self.inbox.clone();
        match self.element.play() {
            Ok(promise) => spawn_local(async move {
                let event = match JsFuture::from(promise).await {
                    Ok(_) => MediaEvent::PlayResolved { request },
                    Err(err) => MediaEvent::PlayRejected {
                        request,
                        reason: describe_js_error(&err),
                    },
                };
                inbox.push(event);
            }),
            Err(err) => inbox.push(MediaEvent::PlayRejected {
                request,
                reason: describe_js_error(&err),
            }),
        }
    }

    fn pause(&mut self) {
        let _ = self.element.pause();
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn can_play_type(&self, mime: &str) -> bool {
        // "" means no; "maybe" and "probably" are worth a try
        !self.element.can_play_type(mime).is_empty()
    }
}

fn describe_js_error(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| "the browser refused to start playback".to_string())
}
