#![forbid(unsafe_code)]

//! `ScrollContainer` over a DOM element.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Weak;

use menuscroll_core::container::{ListenerId, ListenerKind, ListenerOptions};
use menuscroll_core::{
    ContainerError, EventResponse, HostEvent, ScrollBehavior, ScrollContainer, ScrollMetrics,
    TouchInput,
};
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Event, HtmlElement, ScrollToOptions, TouchEvent};
use web_time::Instant;

use crate::bridge::{Bridge, dispatch};
use crate::payload::touch_phase;

struct Registration {
    kind: ListenerKind,
    closure: Closure<dyn FnMut(Event)>,
}

/// The menu's scrolling element. Listeners registered through it forward
/// their events to the bridge and honour `preventDefault` responses.
pub(crate) struct DomContainer {
    element: HtmlElement,
    bridge: Weak<Bridge>,
    listeners: RefCell<HashMap<ListenerId, Registration>>,
    next_id: Cell<u64>,
}

impl DomContainer {
    pub(crate) fn new(element: HtmlElement, bridge: Weak<Bridge>) -> Self {
        Self {
            element,
            bridge,
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }
}

fn to_dom_behavior(behavior: ScrollBehavior) -> web_sys::ScrollBehavior {
    match behavior {
        ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
        ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
    }
}

/// Primary touch point of a touch event. Ending phases only carry the lifted
/// finger in `changedTouches`.
fn touch_input(event: &Event, kind: ListenerKind) -> Option<TouchInput> {
    let phase = touch_phase(kind.event_name())?;
    let touch_event = event.dyn_ref::<TouchEvent>()?;
    let list = match kind {
        ListenerKind::TouchEnd | ListenerKind::TouchCancel => touch_event.changed_touches(),
        _ => touch_event.touches(),
    };
    let touch = list.get(0)?;
    Some(TouchInput::new(phase, f64::from(touch.client_y()), Instant::now()))
}

fn host_event(event: &Event, kind: ListenerKind) -> Option<HostEvent> {
    match kind {
        ListenerKind::Scroll => Some(HostEvent::Scroll { at: Instant::now() }),
        _ => touch_input(event, kind).map(HostEvent::Touch),
    }
}

impl ScrollContainer for DomContainer {
    fn metrics(&self) -> Result<ScrollMetrics, ContainerError> {
        if !self.element.is_connected() {
            return Err(ContainerError::Detached);
        }
        ScrollMetrics::checked(
            f64::from(self.element.scroll_top()),
            f64::from(self.element.scroll_height()),
            f64::from(self.element.client_height()),
        )
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) -> Result<(), ContainerError> {
        if !self.element.is_connected() {
            return Err(ContainerError::Detached);
        }
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(to_dom_behavior(behavior));
        self.element.scroll_to_with_scroll_to_options(&options);
        Ok(())
    }

    fn add_listener(&self, kind: ListenerKind, options: ListenerOptions) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let bridge = self.bridge.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(mapped) = host_event(&event, kind) else {
                return;
            };
            let response: EventResponse = dispatch(&bridge, mapped);
            if response.prevent_default && event.cancelable() {
                event.prevent_default();
            }
        });

        let dom_options = AddEventListenerOptions::new();
        dom_options.set_passive(options.passive);
        if let Err(err) = self
            .element
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind.event_name(),
                closure.as_ref().unchecked_ref(),
                &dom_options,
            )
        {
            warn!(event = kind.event_name(), error = ?err, "addEventListener failed");
        }
        trace!(event = kind.event_name(), passive = options.passive, "listener added");
        self.listeners
            .borrow_mut()
            .insert(id, Registration { kind, closure });
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        let Some(registration) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };
        let event = registration.kind.event_name();
        if let Err(err) = self
            .element
            .remove_event_listener_with_callback(event, registration.closure.as_ref().unchecked_ref())
        {
            warn!(event, error = ?err, "removeEventListener failed");
        }
        trace!(event, "listener removed");
    }
}

impl Drop for DomContainer {
    fn drop(&mut self) {
        let ids: Vec<ListenerId> = self.listeners.borrow().keys().copied().collect();
        for id in ids {
            self.remove_listener(id);
        }
    }
}
