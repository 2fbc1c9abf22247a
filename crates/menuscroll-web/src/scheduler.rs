#![forbid(unsafe_code)]

//! `Scheduler` over `setTimeout` and `requestAnimationFrame`.
//!
//! One persistent closure serves every timeout (the timer id travels as the
//! callback argument) and one serves every frame. Frame requests made before
//! the next paint share a single `requestAnimationFrame` call.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use menuscroll_core::{FrameId, HostEvent, Scheduler, TimerId};
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Window;
use web_time::{Duration, Instant};

use crate::bridge::{Bridge, dispatch};

pub(crate) struct BrowserScheduler {
    window: Window,
    bridge: Weak<Bridge>,
    next_id: Cell<u64>,
    /// Pending timers and their browser handles.
    timers: RefCell<HashMap<TimerId, i32>>,
    /// Frame ids due at the next animation frame.
    frames: RefCell<Vec<FrameId>>,
    frame_handle: Cell<Option<i32>>,
    on_timeout: Closure<dyn FnMut(JsValue)>,
    on_frame: Closure<dyn FnMut(f64)>,
}

impl BrowserScheduler {
    pub(crate) fn new(window: Window, bridge: Weak<Bridge>) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| {
            let timeout_self = this.clone();
            let on_timeout = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| {
                if let (Some(this), Some(raw)) = (timeout_self.upgrade(), raw.as_f64()) {
                    this.fire_timer(TimerId(raw as u64));
                }
            });
            let frame_self = this.clone();
            let on_frame = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
                if let Some(this) = frame_self.upgrade() {
                    this.fire_frames();
                }
            });
            Self {
                window,
                bridge,
                next_id: Cell::new(0),
                timers: RefCell::new(HashMap::new()),
                frames: RefCell::new(Vec::new()),
                frame_handle: Cell::new(None),
                on_timeout,
                on_frame,
            }
        })
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn fire_timer(&self, id: TimerId) {
        // Cleared timers may still be in flight.
        if self.timers.borrow_mut().remove(&id).is_none() {
            return;
        }
        dispatch(&self.bridge, HostEvent::Timer { id, at: Instant::now() });
    }

    fn fire_frames(&self) {
        self.frame_handle.set(None);
        let due = std::mem::take(&mut *self.frames.borrow_mut());
        let at = Instant::now();
        for id in due {
            dispatch(&self.bridge, HostEvent::Frame { id, at });
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn set_timeout(&self, delay: Duration) -> TimerId {
        let id = TimerId(self.next());
        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_1(
                self.on_timeout.as_ref().unchecked_ref(),
                delay_ms,
                &JsValue::from_f64(id.0 as f64),
            ) {
            Ok(handle) => {
                self.timers.borrow_mut().insert(id, handle);
            }
            Err(err) => warn!(error = ?err, "setTimeout failed"),
        }
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(handle) = self.timers.borrow_mut().remove(&id) {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn request_frame(&self) -> FrameId {
        let id = FrameId(self.next());
        self.frames.borrow_mut().push(id);
        if self.frame_handle.get().is_none() {
            match self
                .window
                .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
            {
                Ok(handle) => self.frame_handle.set(Some(handle)),
                Err(err) => warn!(error = ?err, "requestAnimationFrame failed"),
            }
        }
        id
    }

    fn cancel_frame(&self, id: FrameId) {
        let now_empty = {
            let mut frames = self.frames.borrow_mut();
            frames.retain(|f| *f != id);
            frames.is_empty()
        };
        if now_empty && let Some(handle) = self.frame_handle.take() {
            if let Err(err) = self.window.cancel_animation_frame(handle) {
                warn!(error = ?err, "cancelAnimationFrame failed");
            }
        }
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.borrow_mut().drain() {
            self.window.clear_timeout_with_handle(handle);
        }
        if let Some(handle) = self.frame_handle.take()
            && let Err(err) = self.window.cancel_animation_frame(handle)
        {
            warn!(error = ?err, "cancelAnimationFrame failed");
        }
    }
}
