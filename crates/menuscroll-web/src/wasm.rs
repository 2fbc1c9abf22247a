#![forbid(unsafe_code)]

use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use menuscroll_core::{
    HostEvent, HostServices, MenuScrollConfig, MenuScrollController, Platform, ScrollContainer,
    ScrollState, TouchConfigOverrides,
};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlElement, Window};
use web_time::Instant;

use crate::a11y::{LiveRegionAnnouncer, MediaQueryMotion};
use crate::bridge::{Bridge, dispatch};
use crate::dom::DomContainer;
use crate::payload::{ORIENTATION_CHANGE_EVENT, RESIZE_EVENT, parse_behavior, state_json};
use crate::scheduler::BrowserScheduler;

struct WindowListener {
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// Scroll tracking, touch momentum, and indicator state for one mobile menu.
///
/// ```js
/// const menu = new MobileMenuScroll(JSON.stringify({ tracker: { debounceMs: 150 } }));
/// menu.onScrollStateChange((state) => nav.className = menu.className());
/// menu.setContainer(document.querySelector("#mobile-menu"));
/// // on unmount
/// menu.destroy();
/// ```
#[wasm_bindgen]
pub struct MobileMenuScroll {
    bridge: Rc<Bridge>,
    window: Option<Window>,
    announcer: Rc<LiveRegionAnnouncer>,
    window_listeners: Vec<WindowListener>,
    destroyed: bool,
}

#[wasm_bindgen]
impl MobileMenuScroll {
    /// Create a menu from an optional JSON config. Malformed or out-of-range
    /// config values fall back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<MobileMenuScroll, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let config = config_json
            .as_deref()
            .map(MenuScrollConfig::from_json_lenient)
            .unwrap_or_default();
        let platform = match window.navigator().user_agent() {
            Ok(ua) => Platform::detect(&ua),
            Err(_) => Platform::Unknown,
        };

        let bridge = Rc::new(Bridge::new());
        let scheduler = BrowserScheduler::new(window.clone(), Rc::downgrade(&bridge));
        let announcer = Rc::new(LiveRegionAnnouncer::attach(window.document().as_ref()));
        let motion = Rc::new(MediaQueryMotion::new(&window));
        let services = HostServices::new(scheduler, announcer.clone(), motion);
        bridge.install(MenuScrollController::new(config, services, platform));

        let window_listeners = [RESIZE_EVENT, ORIENTATION_CHANGE_EVENT]
            .into_iter()
            .filter_map(|event| attach_window_listener(&window, &bridge, event))
            .collect();

        debug!(platform = platform.as_str(), "MobileMenuScroll created");
        Ok(Self {
            bridge,
            window: Some(window),
            announcer,
            window_listeners,
            destroyed: false,
        })
    }

    /// Bind to the menu's scrolling element, or unbind with `null`.
    #[wasm_bindgen(js_name = setContainer)]
    pub fn set_container(&self, element: Option<HtmlElement>) {
        let weak = Rc::downgrade(&self.bridge);
        let container = element
            .map(|el| Rc::new(DomContainer::new(el, weak)) as Rc<dyn ScrollContainer>);
        self.bridge.with(|controller| controller.set_container(container));
    }

    /// Recompute immediately (after layout changes the host knows about).
    #[wasm_bindgen(js_name = updateScrollState)]
    pub fn update_scroll_state(&self) {
        self.bridge.with(MenuScrollController::update_scroll_state);
    }

    /// `behavior` is `"smooth"` (default), `"auto"`, or `"instant"`.
    #[wasm_bindgen(js_name = scrollTo)]
    pub fn scroll_to(&self, position: f64, behavior: Option<String>) {
        let behavior = parse_behavior(behavior.as_deref());
        self.bridge.with(|c| c.scroll_to(position, behavior));
    }

    #[wasm_bindgen(js_name = scrollToTop)]
    pub fn scroll_to_top(&self) {
        self.bridge.with(|c| c.scroll_to_top());
    }

    #[wasm_bindgen(js_name = scrollToBottom)]
    pub fn scroll_to_bottom(&self) {
        self.bridge.with(|c| c.scroll_to_bottom());
    }

    #[wasm_bindgen(js_name = scrollBy)]
    pub fn scroll_by(&self, delta: f64) {
        self.bridge.with(|c| c.scroll_by(delta));
    }

    /// Current state as a plain object.
    #[wasm_bindgen(js_name = scrollState)]
    pub fn scroll_state(&self) -> JsValue {
        let json = state_json(&self.state());
        js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL)
    }

    /// Space-separated classes for the container.
    #[wasm_bindgen(js_name = className)]
    pub fn class_name(&self) -> String {
        self.bridge
            .with(|c| c.indicators().class_name())
            .unwrap_or_default()
    }

    /// Inline style text carrying the scroll custom properties.
    #[wasm_bindgen(js_name = styleText)]
    pub fn style_text(&self) -> String {
        self.bridge
            .with(|c| c.indicators().style_text())
            .unwrap_or_default()
    }

    /// Custom properties as `{ "--scroll-percentage": "50%", ... }`.
    #[wasm_bindgen(js_name = customProperties)]
    pub fn custom_properties(&self) -> Object {
        let out = Object::new();
        let properties = self
            .bridge
            .with(|c| c.indicators().custom_properties)
            .unwrap_or_default();
        for (name, value) in properties {
            if Reflect::set(&out, &JsValue::from_str(name), &JsValue::from_str(&value)).is_err() {
                warn!(property = name, "failed to set custom property");
            }
        }
        out
    }

    #[wasm_bindgen(js_name = isTouchActive)]
    pub fn is_touch_active(&self) -> bool {
        self.bridge
            .with(|c| c.touch_state().is_active || c.momentum_state().is_active)
            .unwrap_or(false)
    }

    /// Called with the state object on every recomputation, and once when a
    /// container is attached.
    #[wasm_bindgen(js_name = onScrollStateChange)]
    pub fn on_scroll_state_change(&self, callback: Function) {
        self.bridge.add_state_listener(callback);
    }

    /// Called with `{ fps, frameCount }` when scrolling drops below the
    /// configured frame rate.
    #[wasm_bindgen(js_name = onPerformanceDegraded)]
    pub fn on_performance_degraded(&self, callback: Function) {
        self.bridge.add_perf_listener(callback);
    }

    /// Merge touch overrides (camelCase JSON, e.g. `{"momentumDecay": 0.9}`)
    /// into the live configuration.
    #[wasm_bindgen(js_name = updateTouchConfig)]
    pub fn update_touch_config(&self, overrides_json: &str) -> Result<(), JsValue> {
        let overrides: TouchConfigOverrides = serde_json::from_str(overrides_json)
            .map_err(|err| JsValue::from_str(&format!("invalid touch config: {err}")))?;
        self.bridge.with(|c| c.update_touch_config(&overrides));
        Ok(())
    }

    /// Drain queued live-region announcements for host-side screen-reader wiring.
    #[wasm_bindgen(js_name = drainAccessibilityAnnouncements)]
    pub fn drain_accessibility_announcements(&self) -> Array {
        let out = Array::new();
        for entry in self.announcer.drain() {
            out.push(&JsValue::from_str(&entry.message));
        }
        out
    }

    /// Detach every listener, cancel pending timers and frames, and remove
    /// the live region. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(window) = self.window.as_ref() {
            for listener in self.window_listeners.drain(..) {
                if let Err(err) = window.remove_event_listener_with_callback(
                    listener.event,
                    listener.closure.as_ref().unchecked_ref(),
                ) {
                    warn!(event = listener.event, error = ?err, "removeEventListener failed");
                }
            }
        }
        if let Some(mut controller) = self.bridge.take() {
            controller.destroy();
        }
        self.bridge.flush();
        self.bridge.clear_listeners();
        self.announcer.detach();
        self.destroyed = true;
        debug!("MobileMenuScroll destroyed");
    }
}

impl MobileMenuScroll {
    fn state(&self) -> ScrollState {
        self.bridge.with(|c| c.state()).unwrap_or_default()
    }
}

impl Drop for MobileMenuScroll {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn attach_window_listener(
    window: &Window,
    bridge: &Rc<Bridge>,
    event: &'static str,
) -> Option<WindowListener> {
    let weak = Rc::downgrade(bridge);
    let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let at = Instant::now();
        let host_event = if event == RESIZE_EVENT {
            HostEvent::Resize { at }
        } else {
            HostEvent::OrientationChange { at }
        };
        dispatch(&weak, host_event);
    });
    match window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        Ok(()) => Some(WindowListener { event, closure }),
        Err(err) => {
            warn!(event, error = ?err, "failed to listen on window");
            None
        }
    }
}
