#![forbid(unsafe_code)]

//! In-memory host for tests and non-browser embedders.
//!
//! [`HeadlessContainer`] behaves like an overflowing element that scrolls
//! instantly and clamps like the DOM does. [`ManualScheduler`] queues timers
//! and frames until the caller takes them, so time only advances when a test
//! says so.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use web_time::Duration;

use crate::a11y::{Announcer, MotionPreference, Politeness};
use crate::container::{
    ListenerId, ListenerKind, ListenerOptions, ScrollBehavior, ScrollContainer, ScrollMetrics,
};
use crate::error::ContainerError;
use crate::schedule::{FrameId, Scheduler, TimerId};

/// Scriptable scroll container.
#[derive(Debug, Default)]
pub struct HeadlessContainer {
    scroll_top: Cell<f64>,
    scroll_height: Cell<f64>,
    client_height: Cell<f64>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    reads: Cell<u64>,
    listeners: RefCell<BTreeMap<ListenerId, (ListenerKind, ListenerOptions)>>,
    next_listener: Cell<u64>,
    added: Cell<usize>,
    removed: Cell<usize>,
    scroll_calls: RefCell<Vec<(f64, ScrollBehavior)>>,
}

impl HeadlessContainer {
    #[must_use]
    pub fn new(scroll_height: f64, client_height: f64) -> Rc<Self> {
        let host = Self::default();
        host.set_heights(scroll_height, client_height);
        Rc::new(host)
    }

    pub fn set_scroll_top(&self, top: f64) {
        self.scroll_top.set(top);
    }

    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top.get()
    }

    /// Resize content and viewport, clamping the offset like a reflow would.
    pub fn set_heights(&self, scroll_height: f64, client_height: f64) {
        self.scroll_height.set(scroll_height);
        self.client_height.set(client_height);
        let max = (scroll_height - client_height).max(0.0);
        if self.scroll_top.get() > max {
            self.scroll_top.set(max);
        }
    }

    /// Make every `scrollTop` read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Metric reads attempted, including failed ones.
    #[must_use]
    pub fn read_count(&self) -> u64 {
        self.reads.get()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[must_use]
    pub fn added_total(&self) -> usize {
        self.added.get()
    }

    #[must_use]
    pub fn removed_total(&self) -> usize {
        self.removed.get()
    }

    /// Options of every live listener of `kind`, in registration order.
    #[must_use]
    pub fn listeners_for(&self, kind: ListenerKind) -> Vec<ListenerOptions> {
        self.listeners
            .borrow()
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, options)| *options)
            .collect()
    }

    #[must_use]
    pub fn scroll_calls(&self) -> Vec<(f64, ScrollBehavior)> {
        self.scroll_calls.borrow().clone()
    }

    #[must_use]
    pub fn last_scroll_call(&self) -> Option<(f64, ScrollBehavior)> {
        self.scroll_calls.borrow().last().copied()
    }
}

impl ScrollContainer for HeadlessContainer {
    fn metrics(&self) -> Result<ScrollMetrics, ContainerError> {
        self.reads.set(self.reads.get() + 1);
        if self.fail_reads.get() {
            return Err(ContainerError::PropertyAccess {
                property: "scrollTop",
            });
        }
        ScrollMetrics::checked(
            self.scroll_top.get(),
            self.scroll_height.get(),
            self.client_height.get(),
        )
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) -> Result<(), ContainerError> {
        if self.fail_writes.get() {
            return Err(ContainerError::PropertyAccess {
                property: "scrollTop",
            });
        }
        self.scroll_calls.borrow_mut().push((top, behavior));
        let max = (self.scroll_height.get() - self.client_height.get()).max(0.0);
        self.scroll_top.set(top.clamp(0.0, max));
        Ok(())
    }

    fn add_listener(&self, kind: ListenerKind, options: ListenerOptions) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, (kind, options));
        self.added.set(self.added.get() + 1);
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        if self.listeners.borrow_mut().remove(&id).is_some() {
            self.removed.set(self.removed.get() + 1);
        }
    }
}

/// Scheduler whose callbacks run only when taken.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: Cell<u64>,
    timers: RefCell<BTreeMap<TimerId, Duration>>,
    frames: RefCell<VecDeque<FrameId>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Oldest pending timer with its requested delay, without removing it.
    #[must_use]
    pub fn next_timer(&self) -> Option<(TimerId, Duration)> {
        self.timers
            .borrow()
            .iter()
            .next()
            .map(|(id, delay)| (*id, *delay))
    }

    /// Remove and return the oldest pending timer.
    pub fn take_timer(&self) -> Option<TimerId> {
        self.timers.borrow_mut().pop_first().map(|(id, _)| id)
    }

    /// Remove and return the oldest pending frame.
    pub fn take_frame(&self) -> Option<FrameId> {
        self.frames.borrow_mut().pop_front()
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay: Duration) -> TimerId {
        let id = TimerId(self.next());
        self.timers.borrow_mut().insert(id, delay);
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers.borrow_mut().remove(&id);
    }

    fn request_frame(&self) -> FrameId {
        let id = FrameId(self.next());
        self.frames.borrow_mut().push_back(id);
        id
    }

    fn cancel_frame(&self, id: FrameId) {
        self.frames.borrow_mut().retain(|f| *f != id);
    }
}

/// Announcer that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    messages: RefCell<Vec<(String, Politeness)>>,
}

impl RecordingAnnouncer {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<(String, Politeness)> {
        self.messages.borrow().clone()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, message: &str, politeness: Politeness) {
        self.messages
            .borrow_mut()
            .push((message.to_owned(), politeness));
    }
}

/// Reduced-motion preference that can flip at runtime.
#[derive(Debug, Default)]
pub struct MotionSwitch(Cell<bool>);

impl MotionSwitch {
    #[must_use]
    pub fn new(reduced: bool) -> Rc<Self> {
        Rc::new(Self(Cell::new(reduced)))
    }

    pub fn set(&self, reduced: bool) {
        self.0.set(reduced);
    }
}

impl MotionPreference for MotionSwitch {
    fn prefers_reduced_motion(&self) -> bool {
        self.0.get()
    }
}
