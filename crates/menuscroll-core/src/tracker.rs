#![forbid(unsafe_code)]

//! Scroll state tracker for one menu container.
//!
//! The tracker owns the container's passive `scroll` listener, a trailing
//! debouncer over native scroll events, the published [`ScrollState`], and
//! the boundary announcements.
//!
//! # Event flow
//!
//! 1. The host reports a native scroll via [`ScrollTracker::handle_scroll`].
//! 2. The first scroll of a burst starts the frame-rate monitor and arms one
//!    debounce timer.
//! 3. When the timer fires ([`ScrollTracker::on_timer`]) before the burst has
//!    gone quiet, it is re-armed for the remaining delay; once quiet, state is
//!    recomputed, published, and the monitor stops.
//!
//! At most one timer, one monitor frame, and one listener are outstanding.
//! Detaching (or dropping the tracker) cancels all of them.
//!
//! # Failure Modes
//!
//! Container reads go through a bounded retry; when they still fail the
//! published state is [`ScrollState::fallback`]. Scroll writes that fail are
//! logged and dropped. Nothing is returned to the caller.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use web_time::{Duration, Instant};

use crate::a11y::{Politeness, REACHED_BOTTOM_MESSAGE, REACHED_TOP_MESSAGE, SCROLLABLE_MESSAGE};
use crate::container::{ListenerKind, ScrollBehavior, ScrollContainer, ScrollMetrics};
use crate::host::HostServices;
use crate::indicators::{ScrollIndicators, project};
use crate::listener::ListenerGuard;
use crate::perf::debounce::{DebounceOptions, Debouncer};
use crate::perf::frame_monitor::{FrameMonitorConfig, FrameRateMonitor, PerformanceReport};
use crate::perf::retry::{RetryPolicy, retry_with_fallback};
use crate::schedule::{FrameId, TimerId};
use crate::state::{DEFAULT_SCROLL_THRESHOLD, ScrollState};

/// Tracker tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollTrackerConfig {
    /// Boundary tolerance in pixels.
    pub scroll_threshold: f64,
    /// Quiet period before a scroll burst is recomputed.
    pub debounce_ms: u64,
    pub announce_scroll_state: bool,
    pub performance_monitoring: bool,
}

impl Default for ScrollTrackerConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            debounce_ms: 100,
            announce_scroll_state: true,
            performance_monitoring: true,
        }
    }
}

impl ScrollTrackerConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Replace an invalid threshold with the default.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if !(self.scroll_threshold.is_finite() && self.scroll_threshold >= 0.0) {
            warn!(
                value = self.scroll_threshold,
                "invalid scroll_threshold, using default"
            );
            self.scroll_threshold = DEFAULT_SCROLL_THRESHOLD;
        }
        self
    }
}

/// Handle for a state-change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type StateCallback = Box<dyn FnMut(&ScrollState)>;
type DegradedCallback = Box<dyn FnMut(&PerformanceReport)>;

/// Tracks scroll state for at most one container at a time.
pub struct ScrollTracker {
    config: ScrollTrackerConfig,
    retry: RetryPolicy,
    services: HostServices,
    container: Option<Rc<dyn ScrollContainer>>,
    listener: Option<ListenerGuard>,
    state: ScrollState,
    debouncer: Debouncer,
    pending_timer: Option<TimerId>,
    monitor: FrameRateMonitor,
    monitor_frame: Option<FrameId>,
    subscribers: Vec<(SubscriptionId, StateCallback)>,
    next_subscription: u64,
    on_degraded: Option<DegradedCallback>,
}

impl fmt::Debug for ScrollTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTracker")
            .field("config", &self.config)
            .field("attached", &self.container.is_some())
            .field("state", &self.state)
            .field("pending_timer", &self.pending_timer)
            .field("monitor", &self.monitor.phase())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ScrollTracker {
    #[must_use]
    pub fn new(config: ScrollTrackerConfig, services: HostServices) -> Self {
        let config = config.sanitized();
        Self {
            debouncer: Debouncer::new(DebounceOptions::trailing(config.debounce())),
            config,
            retry: RetryPolicy::default(),
            services,
            container: None,
            listener: None,
            state: ScrollState::default(),
            pending_timer: None,
            monitor: FrameRateMonitor::new(FrameMonitorConfig::default()),
            monitor_frame: None,
            subscribers: Vec::new(),
            next_subscription: 0,
            on_degraded: None,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_frame_monitor(mut self, config: FrameMonitorConfig) -> Self {
        self.monitor = FrameRateMonitor::new(config);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ScrollTrackerConfig {
        &self.config
    }

    /// Current published snapshot.
    #[must_use]
    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// CSS projection of the current snapshot.
    #[must_use]
    pub fn indicators(&self) -> ScrollIndicators {
        project(&self.state)
    }

    #[must_use]
    pub fn has_container(&self) -> bool {
        self.container.is_some()
    }

    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending_timer
    }

    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_monitoring()
    }

    /// Subscribe to every published snapshot.
    pub fn on_scroll_state_change(&mut self, callback: impl FnMut(&ScrollState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Called once per degradation episode while a scroll burst is monitored.
    pub fn on_performance_degraded(&mut self, callback: impl FnMut(&PerformanceReport) + 'static) {
        self.on_degraded = Some(Box::new(callback));
    }

    /// Attach to `container`, or detach with `None`.
    ///
    /// Attaching publishes the initial snapshot exactly once. Detaching
    /// resets to the default snapshot; detaching with nothing attached does
    /// nothing.
    pub fn set_container(&mut self, container: Option<Rc<dyn ScrollContainer>>) {
        if container.is_none() && self.container.is_none() {
            return;
        }
        self.teardown();

        let Some(container) = container else {
            debug!("scroll container detached");
            self.state = ScrollState::default();
            self.publish();
            return;
        };

        self.listener = Some(ListenerGuard::attach_passive(&container, ListenerKind::Scroll));
        self.container = Some(container);
        self.state = self.measure();
        debug!(state = ?self.state, "scroll container attached");
        if self.state.is_scrollable {
            self.announce(SCROLLABLE_MESSAGE);
        }
        self.publish();
    }

    /// Recompute now and publish (resize, orientation change).
    pub fn update_scroll_state(&mut self) {
        if self.container.is_none() {
            return;
        }
        self.recompute();
    }

    /// Native `scroll` event on the container.
    pub fn handle_scroll(&mut self, now: Instant) {
        if self.container.is_none() {
            return;
        }
        let call = self.debouncer.call(now);
        trace!(burst_started = call.burst_started, "scroll event");
        if call.burst_started && self.config.performance_monitoring && self.monitor.start(now) {
            self.monitor_frame = Some(self.services.scheduler.request_frame());
        }
        if call.fire_now {
            self.recompute();
        }
        if self.pending_timer.is_none() {
            self.arm_timer(now);
        }
    }

    fn arm_timer(&mut self, now: Instant) {
        if let Some(delay) = self.debouncer.delay_from(now) {
            self.pending_timer = Some(self.services.scheduler.set_timeout(delay));
        }
    }

    /// A timer fired. Returns `false` if `timer` is not ours.
    pub fn on_timer(&mut self, timer: TimerId, now: Instant) -> bool {
        if self.pending_timer != Some(timer) {
            return false;
        }
        self.pending_timer = None;
        if self.debouncer.poll(now) {
            self.recompute();
        }
        if self.debouncer.is_pending() {
            // Scrolling continued since the timer was armed.
            self.arm_timer(now);
        } else {
            self.stop_monitor();
        }
        true
    }

    /// An animation frame fired. Returns `false` if `frame` is not ours.
    pub fn on_frame(&mut self, frame: FrameId, now: Instant) -> bool {
        if self.monitor_frame != Some(frame) {
            return false;
        }
        self.monitor_frame = None;
        if let Some(report) = self.monitor.record_frame(now)
            && let Some(callback) = self.on_degraded.as_mut()
        {
            callback(&report);
        }
        if self.monitor.is_monitoring() {
            self.monitor_frame = Some(self.services.scheduler.request_frame());
        }
        true
    }

    /// Scroll to an absolute offset. Animated behaviors collapse to
    /// [`ScrollBehavior::Auto`] under a reduced-motion preference.
    pub fn scroll_to(&self, position: f64, behavior: ScrollBehavior) {
        let Some(container) = self.container.as_ref() else {
            return;
        };
        if !position.is_finite() {
            warn!(position, "ignoring non-finite scroll target");
            return;
        }
        let reduced = self.services.motion.prefers_reduced_motion();
        let behavior = behavior.respecting_motion(reduced);
        trace!(position, behavior = behavior.as_str(), "scroll_to");
        retry_with_fallback(
            &self.retry,
            "tracker.scroll_to",
            |_| container.scroll_to(position, behavior),
            || (),
        );
    }

    pub fn scroll_to_top(&self) {
        self.scroll_to(0.0, ScrollBehavior::Smooth);
    }

    pub fn scroll_to_bottom(&self) {
        if let Some(metrics) = self.read_metrics() {
            self.scroll_to(metrics.max_scroll_top(), ScrollBehavior::Smooth);
        }
    }

    /// Scroll relative to the current offset. Reads then writes within one
    /// event-loop turn.
    pub fn scroll_by(&self, delta: f64) {
        if let Some(metrics) = self.read_metrics() {
            self.scroll_to(metrics.scroll_top + delta, ScrollBehavior::Smooth);
        }
    }

    fn read_metrics(&self) -> Option<ScrollMetrics> {
        let container = self.container.as_ref()?;
        retry_with_fallback(
            &self.retry,
            "tracker.metrics",
            |_| container.metrics().map(Some),
            || None,
        )
    }

    fn measure(&self) -> ScrollState {
        match self.read_metrics() {
            Some(metrics) => ScrollState::compute(metrics, self.config.scroll_threshold),
            None => ScrollState::fallback(),
        }
    }

    fn recompute(&mut self) {
        let previous = self.state;
        let next = self.measure();
        if next.is_scrollable {
            if next.is_at_top && !previous.is_at_top {
                self.announce(REACHED_TOP_MESSAGE);
            } else if next.is_at_bottom && !previous.is_at_bottom {
                self.announce(REACHED_BOTTOM_MESSAGE);
            }
        }
        self.state = next;
        self.publish();
    }

    fn announce(&self, message: &str) {
        if self.config.announce_scroll_state {
            debug!(message, "announce");
            self.services.announcer.announce(message, Politeness::Polite);
        }
    }

    fn publish(&mut self) {
        let state = self.state;
        for (_, callback) in &mut self.subscribers {
            callback(&state);
        }
    }

    fn stop_monitor(&mut self) {
        if let Some(frame) = self.monitor_frame.take() {
            self.services.scheduler.cancel_frame(frame);
        }
        self.monitor.stop();
    }

    fn teardown(&mut self) {
        if let Some(mut listener) = self.listener.take() {
            listener.remove();
        }
        if let Some(timer) = self.pending_timer.take() {
            self.services.scheduler.clear_timeout(timer);
        }
        self.debouncer.cancel();
        self.stop_monitor();
        self.container = None;
    }
}

impl Drop for ScrollTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a11y::StaticMotion;
    use crate::headless::{HeadlessContainer, ManualScheduler, RecordingAnnouncer};
    use std::cell::RefCell;

    struct Rig {
        host: Rc<HeadlessContainer>,
        scheduler: Rc<ManualScheduler>,
        announcer: Rc<RecordingAnnouncer>,
        tracker: ScrollTracker,
        published: Rc<RefCell<Vec<ScrollState>>>,
        t0: Instant,
    }

    fn rig_with(config: ScrollTrackerConfig, reduced_motion: bool) -> Rig {
        let host = HeadlessContainer::new(800.0, 400.0);
        let scheduler = ManualScheduler::new();
        let announcer = RecordingAnnouncer::new();
        let services = HostServices::new(
            scheduler.clone(),
            announcer.clone(),
            Rc::new(StaticMotion(reduced_motion)),
        );
        let mut tracker = ScrollTracker::new(config, services);
        let published = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&published);
        tracker.on_scroll_state_change(move |s| sink.borrow_mut().push(*s));
        Rig {
            host,
            scheduler,
            announcer,
            tracker,
            published,
            t0: Instant::now(),
        }
    }

    fn rig() -> Rig {
        rig_with(ScrollTrackerConfig::default(), false)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    impl Rig {
        fn attach(&mut self) {
            self.tracker.set_container(Some(self.host.clone()));
        }

        /// Scroll the container and settle the debounce.
        fn scroll_and_settle(&mut self, top: f64, at_ms: u64) {
            self.host.set_scroll_top(top);
            self.tracker.handle_scroll(self.t0 + ms(at_ms));
            self.settle(at_ms + 1000);
        }

        fn settle(&mut self, at_ms: u64) {
            while let Some(timer) = self.scheduler.take_timer() {
                assert!(self.tracker.on_timer(timer, self.t0 + ms(at_ms)));
            }
        }
    }

    #[test]
    fn attach_publishes_initial_state_once() {
        let mut r = rig();
        r.attach();
        let published = r.published.borrow();
        assert_eq!(published.len(), 1);
        assert!(published[0].is_scrollable && published[0].is_at_top);
        assert_eq!(r.host.listeners_for(ListenerKind::Scroll).len(), 1);
    }

    #[test]
    fn attach_announces_scrollable_menu() {
        let mut r = rig();
        r.attach();
        assert_eq!(r.announcer.messages(), vec![SCROLLABLE_MESSAGE.to_string()]);
    }

    #[test]
    fn short_menu_is_not_announced() {
        let mut r = rig();
        r.host.set_heights(300.0, 400.0);
        r.attach();
        assert!(r.announcer.messages().is_empty());
        assert!(!r.tracker.state().is_scrollable);
    }

    #[test]
    fn reattach_replaces_listener() {
        let mut r = rig();
        r.attach();
        let other = HeadlessContainer::new(1200.0, 400.0);
        r.tracker.set_container(Some(other.clone()));
        assert_eq!(r.host.listener_count(), 0);
        assert_eq!(other.listener_count(), 1);
        assert_eq!(r.tracker.state().scroll_height, 1200.0);
    }

    #[test]
    fn detach_resets_and_second_detach_is_noop() {
        let mut r = rig();
        r.attach();
        r.tracker.set_container(None);
        assert_eq!(r.tracker.state(), ScrollState::default());
        assert_eq!(r.host.listener_count(), 0);
        let count = r.published.borrow().len();
        r.tracker.set_container(None);
        assert_eq!(r.published.borrow().len(), count);
    }

    #[test]
    fn detach_without_container_is_noop() {
        let mut r = rig();
        r.tracker.set_container(None);
        assert!(r.published.borrow().is_empty());
    }

    #[test]
    fn scroll_is_debounced_to_trailing_edge() {
        let mut r = rig();
        r.attach();
        for (i, top) in [50.0, 120.0, 200.0].into_iter().enumerate() {
            r.host.set_scroll_top(top);
            r.tracker.handle_scroll(r.t0 + ms(i as u64 * 20));
        }
        assert_eq!(r.scheduler.pending_timers(), 1);
        assert_eq!(r.published.borrow().len(), 1);

        // First timer lands before the burst is quiet: re-armed, no publish.
        let timer = r.scheduler.take_timer().unwrap();
        assert!(r.tracker.on_timer(timer, r.t0 + ms(100)));
        assert_eq!(r.published.borrow().len(), 1);
        assert_eq!(r.scheduler.pending_timers(), 1);

        r.settle(140);
        let published = r.published.borrow();
        assert_eq!(published.len(), 2);
        assert_eq!(published[1].scroll_percentage, 50.0);
    }

    #[test]
    fn boundary_announced_once_per_transition() {
        let mut r = rig();
        r.host.set_scroll_top(50.0);
        r.attach();
        r.scroll_and_settle(0.0, 0);
        r.scroll_and_settle(0.0, 2000);
        let tops = r
            .announcer
            .messages()
            .iter()
            .filter(|m| m.as_str() == REACHED_TOP_MESSAGE)
            .count();
        assert_eq!(tops, 1);

        r.scroll_and_settle(400.0, 4000);
        r.scroll_and_settle(398.0, 6000);
        let bottoms = r
            .announcer
            .messages()
            .iter()
            .filter(|m| m.as_str() == REACHED_BOTTOM_MESSAGE)
            .count();
        assert_eq!(bottoms, 1);
    }

    #[test]
    fn announcements_can_be_disabled() {
        let mut r = rig_with(
            ScrollTrackerConfig {
                announce_scroll_state: false,
                ..ScrollTrackerConfig::default()
            },
            false,
        );
        r.host.set_scroll_top(200.0);
        r.attach();
        r.scroll_and_settle(0.0, 0);
        assert!(r.announcer.messages().is_empty());
    }

    #[test]
    fn unreadable_container_yields_fallback() {
        let mut r = rig();
        r.host.fail_reads(true);
        r.attach();
        assert_eq!(r.tracker.state(), ScrollState::fallback());
        assert!(r.tracker.state().is_at_top);
        assert_eq!(r.published.borrow().len(), 1);
    }

    #[test]
    fn reduced_motion_forces_auto() {
        let mut r = rig_with(ScrollTrackerConfig::default(), true);
        r.attach();
        r.tracker.scroll_to(200.0, ScrollBehavior::Smooth);
        assert_eq!(r.host.last_scroll_call(), Some((200.0, ScrollBehavior::Auto)));
    }

    #[test]
    fn scroll_helpers() {
        let mut r = rig();
        r.attach();
        r.tracker.scroll_to_bottom();
        assert_eq!(r.host.last_scroll_call(), Some((400.0, ScrollBehavior::Smooth)));
        r.tracker.scroll_by(-150.0);
        assert_eq!(r.host.scroll_top(), 250.0);
        r.tracker.scroll_to_top();
        assert_eq!(r.host.scroll_top(), 0.0);
    }

    #[test]
    fn scroll_without_container_is_ignored() {
        let mut r = rig();
        r.tracker.handle_scroll(r.t0);
        r.tracker.scroll_to(10.0, ScrollBehavior::Auto);
        assert_eq!(r.scheduler.pending_timers(), 0);
        assert_eq!(r.host.last_scroll_call(), None);
    }

    #[test]
    fn detach_cancels_timer_and_monitor() {
        let mut r = rig();
        r.attach();
        r.tracker.handle_scroll(r.t0);
        assert_eq!(r.scheduler.pending_timers(), 1);
        assert_eq!(r.scheduler.pending_frames(), 1);
        assert!(r.tracker.is_monitoring());

        r.tracker.set_container(None);
        assert_eq!(r.scheduler.pending_timers(), 0);
        assert_eq!(r.scheduler.pending_frames(), 0);
        assert!(!r.tracker.is_monitoring());
    }

    #[test]
    fn monitor_reports_slow_frames() {
        let mut r = rig();
        r.tracker = ScrollTracker::new(
            ScrollTrackerConfig::default(),
            HostServices::with_scheduler(r.scheduler.clone()),
        )
        .with_frame_monitor(FrameMonitorConfig {
            sample_window: 3,
            min_fps: 30.0,
        });
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        r.tracker.on_performance_degraded(move |rep| sink.borrow_mut().push(*rep));
        r.attach();
        r.tracker.handle_scroll(r.t0);
        for i in 1..=4 {
            let frame = r.scheduler.take_frame().unwrap();
            assert!(r.tracker.on_frame(frame, r.t0 + ms(i * 100)));
        }
        assert_eq!(reports.borrow().len(), 1);
        assert!(reports.borrow()[0].fps < 30.0);
    }

    #[test]
    fn monitoring_can_be_disabled() {
        let mut r = rig_with(
            ScrollTrackerConfig {
                performance_monitoring: false,
                ..ScrollTrackerConfig::default()
            },
            false,
        );
        r.attach();
        r.tracker.handle_scroll(r.t0);
        assert_eq!(r.scheduler.pending_frames(), 0);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut r = rig();
        let hits = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&hits);
        let id = r.tracker.on_scroll_state_change(move |_| *sink.borrow_mut() += 1);
        r.attach();
        assert!(r.tracker.unsubscribe(id));
        assert!(!r.tracker.unsubscribe(id));
        r.tracker.update_scroll_state();
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn invalid_threshold_is_defaulted() {
        let cfg = ScrollTrackerConfig {
            scroll_threshold: -4.0,
            ..ScrollTrackerConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.scroll_threshold, DEFAULT_SCROLL_THRESHOLD);
    }
}
