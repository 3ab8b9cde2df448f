//! `VistaPlayer` - the JS-facing player object
//!
//! The controller lives in an `Rc<RefCell<_>>` shared with the DOM listeners.
//! Notifications raised during a controller call are queued in an outbox and
//! dispatched as `CustomEvent`s on the container once the borrow is released,
//! so page handlers can call back into the player.

use crate::dom::{BrowserPlatform, DomPoster, DomVideo};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{error, info, warn};
use vista_core::{
    resolve_source_url, HttpSource, MediaEvent, PlayerConfig, PlayerController, PlayerEvent,
    SceneSource,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, CustomEventInit, Element, Event, HtmlImageElement, HtmlVideoElement, Window};

type Controller = PlayerController<DomVideo, DomPoster, BrowserPlatform>;

fn to_js(err: vista_core::Error) -> JsValue {
    js_sys::Error::new(&format!("[{}] {}", err.error_code(), err)).into()
}

fn js_error(message: impl AsRef<str>) -> JsValue {
    js_sys::Error::new(message.as_ref()).into()
}

struct Shared {
    controller: RefCell<Controller>,
    outbox: Rc<RefCell<Vec<PlayerEvent>>>,
    container: Element,
    window: Window,
    drain_scheduled: Cell<bool>,
}

impl Shared {
    /// Run a controller call, then deliver what it emitted
    fn with<R>(self: &Rc<Self>, f: impl FnOnce(&mut Controller) -> R) -> R {
        let result = f(&mut self.controller.borrow_mut());
        self.after_call();
        result
    }

    /// Entry point for DOM listeners; never panics on re-entry
    fn handle(self: &Rc<Self>, source: &str, f: impl FnOnce(&mut Controller) -> vista_core::Result<()>) {
        let result = match self.controller.try_borrow_mut() {
            Ok(mut controller) => f(&mut controller),
            Err(_) => {
                warn!(source, "Player busy, host event dropped");
                return;
            }
        };
        self.after_call();
        if let Err(e) = result {
            warn!(source, code = e.error_code(), error = %e, "Host event failed");
        }
    }

    fn after_call(self: &Rc<Self>) {
        self.flush();
        self.schedule_drain();
    }

    fn flush(&self) {
        loop {
            let pending = std::mem::take(&mut *self.outbox.borrow_mut());
            if pending.is_empty() {
                break;
            }
            for event in pending {
                self.dispatch(event);
            }
        }
    }

    fn dispatch(&self, event: PlayerEvent) {
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        if let Some(id) = event.scene_id() {
            init.set_detail(&JsValue::from_f64(id as f64));
        }

        let result = CustomEvent::new_with_event_init_dict(event.name(), &init)
            .and_then(|custom| self.container.dispatch_event(&custom));
        if let Err(e) = result {
            warn!(event = event.name(), error = ?e, "Failed to dispatch notification");
        }
    }

    /// Drain deferred work from a zero-delay timeout
    fn schedule_drain(self: &Rc<Self>) {
        if self.drain_scheduled.get() || !self.controller.borrow().has_deferred() {
            return;
        }

        let shared = Rc::clone(self);
        let callback = Closure::once_into_js(move || {
            shared.drain_scheduled.set(false);
            shared.with(|c| {
                c.run_deferred();
            });
        });

        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
        {
            Ok(_) => self.drain_scheduled.set(true),
            Err(e) => error!(error = ?e, "Failed to schedule deferred tasks"),
        }
    }

    fn bind_listeners(
        self: &Rc<Self>,
        video: &HtmlVideoElement,
        poster: &HtmlImageElement,
    ) -> Result<(), JsValue> {
        for media_event in MediaEvent::ALL {
            let shared = Rc::clone(self);
            let callback = Closure::wrap(Box::new(move |_event: Event| {
                shared.handle(media_event.dom_name(), |c| c.handle_media_event(media_event));
            }) as Box<dyn FnMut(_)>);
            video.add_event_listener_with_callback(
                media_event.dom_name(),
                callback.as_ref().unchecked_ref(),
            )?;
            callback.forget();
        }

        let shared = Rc::clone(self);
        let poster_cb = Closure::wrap(Box::new(move |_event: Event| {
            shared.handle("poster", |c| {
                c.handle_poster_loaded();
                Ok(())
            });
        }) as Box<dyn FnMut(_)>);
        poster.add_event_listener_with_callback("load", poster_cb.as_ref().unchecked_ref())?;
        poster_cb.forget();

        for name in ["resize", "orientationchange"] {
            let shared = Rc::clone(self);
            let viewport_cb = Closure::wrap(Box::new(move |_event: Event| {
                shared.handle(name, |c| {
                    c.handle_viewport_change();
                    Ok(())
                });
            }) as Box<dyn FnMut(_)>);
            self.window
                .add_event_listener_with_callback(name, viewport_cb.as_ref().unchecked_ref())?;
            viewport_cb.forget();
        }

        Ok(())
    }

    /// Fetch `json_url` in the background and install the scenes
    fn fetch_scenes(self: &Rc<Self>, json_url: &str) -> Result<(), JsValue> {
        let base = self.window.location().href()?;
        let url = resolve_source_url(&base, json_url).map_err(to_js)?;
        info!(url = %url, "Loading scene source");

        let shared = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            let loaded = HttpSource::new(url).load().await;
            match loaded {
                Ok(scenes) => {
                    if let Err(e) = shared.with(|c| c.set_scenes(scenes)) {
                        error!(code = e.error_code(), error = %e, "Failed to install scenes");
                    }
                }
                Err(e) => error!(code = e.error_code(), error = %e, "Scene source failed to load"),
            }
        });
        Ok(())
    }
}

/// Slideshow player bound to a container holding a `<video>` and an `<img>`
#[wasm_bindgen]
pub struct VistaPlayer {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl VistaPlayer {
    /// Create a player from a configuration object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VistaPlayer, JsValue> {
        let config: PlayerConfig = serde_wasm_bindgen::from_value(config)?;
        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;

        let container = document
            .get_element_by_id(&config.container_id)
            .ok_or_else(|| js_error(format!("container #{} not found", config.container_id)))?;
        let video = container
            .query_selector("video")?
            .ok_or_else(|| js_error("container has no <video>"))?
            .dyn_into::<HtmlVideoElement>()
            .map_err(|_| js_error("<video> is not a video element"))?;
        let poster = container
            .query_selector("img")?
            .ok_or_else(|| js_error("container has no <img>"))?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| js_error("<img> is not an image element"))?;

        let json_url = config.json_url.clone();
        let mut controller = PlayerController::new(
            config,
            DomVideo::new(video.clone()),
            DomPoster::new(poster.clone()),
            BrowserPlatform::new(window.clone(), video.clone()),
        )
        .map_err(to_js)?;

        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&outbox);
        controller.subscribe(move |event: &PlayerEvent| sink.borrow_mut().push(*event));
        let needs_fetch = controller.needs_fetch();

        let shared = Rc::new(Shared {
            controller: RefCell::new(controller),
            outbox,
            container,
            window,
            drain_scheduled: Cell::new(false),
        });
        shared.bind_listeners(&video, &poster)?;

        if needs_fetch {
            if let Some(json_url) = json_url {
                shared.fetch_scenes(&json_url)?;
            }
        }
        shared.after_call();

        Ok(VistaPlayer { shared })
    }

    pub fn next(&self) -> Result<(), JsValue> {
        self.shared.with(|c| c.next()).map_err(to_js)
    }

    pub fn prev(&self) -> Result<(), JsValue> {
        self.shared.with(|c| c.prev()).map_err(to_js)
    }

    /// Returns false when the current scene has no playable source
    pub fn play(&self) -> bool {
        self.shared.with(|c| c.play())
    }

    pub fn pause(&self) {
        self.shared.with(|c| c.pause());
    }

    pub fn stop(&self) {
        self.shared.with(|c| c.stop());
    }

    #[wasm_bindgen(js_name = loadScene)]
    pub fn load_scene(&self, id: usize) -> Result<(), JsValue> {
        self.shared.with(|c| c.load_scene(id)).map_err(to_js)
    }

    /// Re-crop poster and video against the current viewport
    pub fn resize(&self) {
        self.shared.with(|c| c.resize());
    }

    #[wasm_bindgen(js_name = currentId)]
    pub fn current_id(&self) -> usize {
        self.shared.controller.borrow().current_id()
    }

    #[wasm_bindgen(js_name = sceneCount)]
    pub fn scene_count(&self) -> usize {
        self.shared.controller.borrow().scenes().len()
    }

    pub fn title(&self) -> Option<String> {
        self.shared.controller.borrow().current_scene().map(|s| s.title.clone())
    }

    pub fn project(&self) -> Option<String> {
        self.shared.controller.borrow().current_scene().map(|s| s.project.clone())
    }

    pub fn category(&self) -> Option<String> {
        self.shared.controller.borrow().current_scene().map(|s| s.category.clone())
    }

    pub fn playable(&self) -> bool {
        self.shared.controller.borrow().is_playable()
    }

    #[wasm_bindgen(js_name = isBuffering)]
    pub fn is_buffering(&self) -> bool {
        self.shared.controller.borrow().state().is_buffering
    }

    /// Buffered share of the duration from the last progress sample
    #[wasm_bindgen(js_name = bufferedPercentage)]
    pub fn buffered_percentage(&self) -> f64 {
        self.shared
            .controller
            .borrow()
            .progress()
            .map(|report| report.percentage)
            .unwrap_or(0.0)
    }

    /// Full navigation and playback state as a plain object
    pub fn state(&self) -> Result<JsValue, JsValue> {
        let state = self.shared.controller.borrow().state();
        Ok(serde_wasm_bindgen::to_value(&state)?)
    }
}
