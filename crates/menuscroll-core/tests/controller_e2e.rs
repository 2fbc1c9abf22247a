//! End-to-end menu scenarios through the headless host.

use std::cell::RefCell;
use std::rc::Rc;

use menuscroll_core::a11y::{REACHED_BOTTOM_MESSAGE, REACHED_TOP_MESSAGE, SCROLLABLE_MESSAGE};
use menuscroll_core::headless::{HeadlessContainer, ManualScheduler, MotionSwitch, RecordingAnnouncer};
use menuscroll_core::{
    HostEvent, HostServices, ListenerKind, MenuScrollConfig, MenuScrollController, Platform,
    ScrollBehavior, ScrollState, TouchInput, TouchPhase,
};
use pretty_assertions::assert_eq;
use web_time::{Duration, Instant};

struct Page {
    host: Rc<HeadlessContainer>,
    scheduler: Rc<ManualScheduler>,
    announcer: Rc<RecordingAnnouncer>,
    motion: Rc<MotionSwitch>,
    menu: MenuScrollController,
    published: Rc<RefCell<Vec<ScrollState>>>,
    t0: Instant,
}

impl Page {
    fn new(scroll_height: f64, client_height: f64) -> Self {
        Self::with_config(scroll_height, client_height, MenuScrollConfig::default())
    }

    fn with_config(scroll_height: f64, client_height: f64, config: MenuScrollConfig) -> Self {
        let host = HeadlessContainer::new(scroll_height, client_height);
        let scheduler = ManualScheduler::new();
        let announcer = RecordingAnnouncer::new();
        let motion = MotionSwitch::new(false);
        let services = HostServices::new(scheduler.clone(), announcer.clone(), motion.clone());
        let mut menu = MenuScrollController::new(config, services, Platform::Unknown);
        let published = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&published);
        menu.on_scroll_state_change(move |s| sink.borrow_mut().push(*s));
        Self {
            host,
            scheduler,
            announcer,
            motion,
            menu,
            published,
            t0: Instant::now(),
        }
    }

    fn at(&self, ms: u64) -> Instant {
        self.t0 + Duration::from_millis(ms)
    }

    fn open(&mut self) {
        self.menu.set_container(Some(self.host.clone()));
    }

    /// Native scroll to `top` at `ms`, then let the debounce settle.
    fn scroll(&mut self, top: f64, ms: u64) {
        self.host.set_scroll_top(top);
        let at = self.at(ms);
        self.menu.handle(HostEvent::Scroll { at });
        self.run_timers(ms + 500);
    }

    fn run_timers(&mut self, ms: u64) {
        let at = self.at(ms);
        while let Some(id) = self.scheduler.take_timer() {
            self.menu.handle(HostEvent::Timer { id, at });
        }
    }

    fn touch(&mut self, phase: TouchPhase, y: f64, ms: u64) -> bool {
        let input = TouchInput::new(phase, y, self.at(ms));
        self.menu.handle(HostEvent::Touch(input)).prevent_default
    }

    fn run_frames(&mut self, ms: u64) -> usize {
        let at = self.at(ms);
        let mut n = 0;
        while let Some(id) = self.scheduler.take_frame() {
            self.menu.handle(HostEvent::Frame { id, at });
            n += 1;
            assert!(n < 10_000, "frames never stopped");
        }
        n
    }

    fn count(&self, message: &str) -> usize {
        self.announcer
            .messages()
            .iter()
            .filter(|m| m.as_str() == message)
            .count()
    }
}

// -- State derivation --

#[test]
fn reference_menu_positions() {
    let mut page = Page::new(800.0, 400.0);
    page.open();

    let top = page.menu.state();
    assert!(top.is_scrollable && !top.can_scroll_up && top.can_scroll_down && top.is_at_top);
    assert_eq!(top.scroll_percentage, 0.0);

    page.scroll(200.0, 0);
    let mid = page.menu.state();
    assert!(mid.can_scroll_up && mid.can_scroll_down);
    assert!(!mid.is_at_top && !mid.is_at_bottom);
    assert_eq!(mid.scroll_percentage, 50.0);

    page.scroll(400.0, 1000);
    let bottom = page.menu.state();
    assert!(bottom.can_scroll_up && !bottom.can_scroll_down && bottom.is_at_bottom);
    assert_eq!(bottom.scroll_percentage, 100.0);
}

#[test]
fn short_menu_is_not_scrollable() {
    let mut page = Page::new(300.0, 400.0);
    page.open();
    let state = page.menu.state();
    assert!(!state.is_scrollable);
    assert!(state.is_at_top);
    assert!(!state.can_scroll_up && !state.can_scroll_down);
    assert_eq!(page.menu.indicators().class_name(), "mobile-menu-scroll");
}

#[test]
fn attach_publishes_exactly_once() {
    let mut page = Page::new(800.0, 400.0);
    page.open();
    assert_eq!(page.published.borrow().len(), 1);
}

#[test]
fn resize_recomputes_synchronously() {
    let mut page = Page::new(800.0, 400.0);
    page.open();
    page.host.set_heights(350.0, 400.0);
    page.menu.handle(HostEvent::Resize { at: page.at(5) });
    assert!(!page.menu.state().is_scrollable);
    page.host.set_heights(900.0, 400.0);
    page.menu.handle(HostEvent::OrientationChange { at: page.at(10) });
    assert!(page.menu.state().is_scrollable);
    assert_eq!(page.published.borrow().len(), 3);
}

// -- Announcements --

#[test]
fn boundary_transitions_announce_once() {
    let mut page = Page::new(800.0, 400.0);
    page.host.set_scroll_top(50.0);
    page.open();
    assert_eq!(page.count(SCROLLABLE_MESSAGE), 1);

    page.scroll(0.0, 0);
    page.scroll(0.0, 1000);
    assert_eq!(page.count(REACHED_TOP_MESSAGE), 1);

    page.scroll(400.0, 2000);
    page.scroll(400.0, 3000);
    assert_eq!(page.count(REACHED_BOTTOM_MESSAGE), 1);

    page.scroll(200.0, 4000);
    page.scroll(0.0, 5000);
    assert_eq!(page.count(REACHED_TOP_MESSAGE), 2);
}

// -- Failure handling --

#[test]
fn unreadable_scroll_top_degrades_to_safe_state() {
    let mut page = Page::new(800.0, 400.0);
    page.host.fail_reads(true);
    page.open();
    let state = page.menu.state();
    assert_eq!(state, ScrollState::fallback());
    assert!(state.is_at_top);
    // One attempt plus the default two retries.
    assert_eq!(page.host.read_count(), 3);
}

#[test]
fn failed_writes_are_swallowed() {
    let mut page = Page::new(800.0, 400.0);
    page.open();
    page.host.fail_writes(true);
    page.menu.scroll_to(100.0, ScrollBehavior::Smooth);
    assert_eq!(page.host.scroll_top(), 0.0);
}

// -- Imperative scrolling --

#[test]
fn reduced_motion_is_read_per_call() {
    let mut page = Page::new(800.0, 400.0);
    page.open();
    page.motion.set(true);
    page.menu.scroll_to(200.0, ScrollBehavior::Smooth);
    assert_eq!(page.host.last_scroll_call(), Some((200.0, ScrollBehavior::Auto)));

    page.motion.set(false);
    page.menu.scroll_to_top();
    assert_eq!(page.host.last_scroll_call(), Some((0.0, ScrollBehavior::Smooth)));
}

// -- Touch --

#[test]
fn flick_runs_momentum_to_rest() {
    let mut page = Page::new(3000.0, 400.0);
    page.host.set_scroll_top(1000.0);
    page.open();

    assert!(!page.touch(TouchPhase::Start, 500.0, 0));
    assert!(page.touch(TouchPhase::Move, 450.0, 50));
    assert!((page.menu.touch_state().velocity + 1.0).abs() < 1e-9);
    page.touch(TouchPhase::End, 450.0, 55);
    assert!(page.menu.momentum_state().is_active);

    let frames = page.run_frames(100);
    assert!(frames > 1);
    assert!(!page.menu.momentum_state().is_active);
    assert!(page.host.scroll_top() > 1050.0);
}

#[test]
fn touch_listeners_active_when_preventing_page_scroll() {
    let mut page = Page::new(800.0, 400.0);
    page.open();
    for kind in ListenerKind::TOUCH {
        let options = page.host.listeners_for(kind);
        assert_eq!(options.len(), 1);
        assert!(!options[0].passive);
    }
    assert!(page.host.listeners_for(ListenerKind::Scroll)[0].passive);
}

// -- Teardown --

#[test]
fn destroy_leaves_no_listeners_timers_or_frames() {
    let mut page = Page::new(2000.0, 400.0);
    page.host.set_scroll_top(800.0);
    page.open();
    page.menu.handle(HostEvent::Scroll { at: page.at(0) });
    page.touch(TouchPhase::Start, 500.0, 0);
    page.touch(TouchPhase::Move, 450.0, 10);
    page.touch(TouchPhase::End, 450.0, 12);
    assert!(page.scheduler.pending_frames() > 0);
    assert!(page.scheduler.pending_timers() > 0);

    page.menu.destroy();
    assert_eq!(page.host.listener_count(), 0);
    assert_eq!(page.host.added_total(), page.host.removed_total());
    assert_eq!(page.scheduler.pending_timers(), 0);
    assert_eq!(page.scheduler.pending_frames(), 0);
    assert_eq!(page.menu.state(), ScrollState::default());
}

#[test]
fn switching_containers_moves_every_listener() {
    let mut page = Page::new(800.0, 400.0);
    page.open();
    let next = HeadlessContainer::new(1600.0, 400.0);
    page.menu.set_container(Some(next.clone()));
    assert_eq!(page.host.listener_count(), 0);
    assert_eq!(next.listener_count(), 5);
    page.menu.set_container(None);
    assert_eq!(next.listener_count(), 0);
    page.menu.set_container(None);
    assert_eq!(page.published.borrow().len(), 3);
}
