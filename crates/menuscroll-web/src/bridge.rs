#![forbid(unsafe_code)]

//! Shared dispatch point between DOM callbacks and the controller.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use menuscroll_core::perf::PerformanceReport;
use menuscroll_core::{EventResponse, HostEvent, MenuScrollController, ScrollState};
use tracing::{trace, warn};
use wasm_bindgen::JsValue;

use crate::payload::{performance_json, state_json};

/// Owns the controller. DOM closures hold a [`Weak`] to it, so nothing fires
/// into a dropped menu.
pub(crate) struct Bridge {
    controller: RefCell<Option<MenuScrollController>>,
    states: Rc<RefCell<Vec<ScrollState>>>,
    reports: Rc<RefCell<Vec<PerformanceReport>>>,
    state_listeners: RefCell<Vec<Function>>,
    perf_listeners: RefCell<Vec<Function>>,
}

impl Bridge {
    pub(crate) fn new() -> Self {
        Self {
            controller: RefCell::new(None),
            states: Rc::new(RefCell::new(Vec::new())),
            reports: Rc::new(RefCell::new(Vec::new())),
            state_listeners: RefCell::new(Vec::new()),
            perf_listeners: RefCell::new(Vec::new()),
        }
    }

    /// Install the controller, routing its callbacks into the outboxes.
    pub(crate) fn install(&self, mut controller: MenuScrollController) {
        let states = Rc::clone(&self.states);
        controller.on_scroll_state_change(move |state| states.borrow_mut().push(*state));
        let reports = Rc::clone(&self.reports);
        controller.on_performance_degraded(move |report| reports.borrow_mut().push(*report));
        *self.controller.borrow_mut() = Some(controller);
    }

    /// Run `f` against the controller, then deliver queued callbacks.
    ///
    /// Returns `None` when the controller is gone or already borrowed (a
    /// re-entrant call from inside a handler).
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut MenuScrollController) -> R) -> Option<R> {
        let result = match self.controller.try_borrow_mut() {
            Ok(mut slot) => slot.as_mut().map(f),
            Err(_) => {
                warn!("re-entrant menu scroll call dropped");
                None
            }
        };
        self.flush();
        result
    }

    pub(crate) fn handle(&self, event: HostEvent) -> EventResponse {
        self.with(|controller| controller.handle(event))
            .unwrap_or_default()
    }

    /// Take the controller out for teardown.
    pub(crate) fn take(&self) -> Option<MenuScrollController> {
        let taken = self.controller.try_borrow_mut().ok()?.take();
        self.flush();
        taken
    }

    pub(crate) fn add_state_listener(&self, callback: Function) {
        self.state_listeners.borrow_mut().push(callback);
    }

    pub(crate) fn add_perf_listener(&self, callback: Function) {
        self.perf_listeners.borrow_mut().push(callback);
    }

    pub(crate) fn clear_listeners(&self) {
        self.state_listeners.borrow_mut().clear();
        self.perf_listeners.borrow_mut().clear();
    }

    pub(crate) fn flush(&self) {
        let states = std::mem::take(&mut *self.states.borrow_mut());
        if !states.is_empty() {
            let listeners = self.state_listeners.borrow().clone();
            for state in &states {
                notify(&listeners, &state_json(state));
            }
        }
        let reports = std::mem::take(&mut *self.reports.borrow_mut());
        if !reports.is_empty() {
            let listeners = self.perf_listeners.borrow().clone();
            for report in &reports {
                notify(&listeners, &performance_json(report));
            }
        }
    }
}

fn notify(listeners: &[Function], json: &str) {
    let payload = js_sys::JSON::parse(json).unwrap_or_else(|_| JsValue::from_str(json));
    for listener in listeners {
        trace!("notify js listener");
        if let Err(err) = listener.call1(&JsValue::NULL, &payload) {
            warn!(error = ?err, "js listener threw");
        }
    }
}

/// Deliver `event` if the bridge is still alive.
pub(crate) fn dispatch(bridge: &Weak<Bridge>, event: HostEvent) -> EventResponse {
    match bridge.upgrade() {
        Some(bridge) => bridge.handle(event),
        None => EventResponse::default(),
    }
}
