#![forbid(unsafe_code)]

//! Touch gesture manager: velocity tracking, page-scroll interception, and
//! momentum scrolling.
//!
//! # State Machine
//!
//! ```text
//!            start                  end / cancel
//!   Idle ──────────▶ Active ──────────────────────▶ Idle
//!                     │  ▲ move                      │
//!                     └──┘                           │ fast release
//!                                                    ▼
//!                                               Momentum ──▶ Idle
//!                                      (floor / boundary / new touch / destroy)
//! ```
//!
//! Direction follows the finger: [`TouchDirection::Down`] means the finger
//! moved toward the bottom of the screen, which scrolls the content toward
//! its top. Velocities are signed px/ms in the same convention.
//!
//! # Invariants
//!
//! 1. At most one pending animation frame is outstanding.
//! 2. A new touch start always cancels running momentum.
//! 3. After [`TouchGestureManager::destroy`] no listeners or frames remain and
//!    every further event is a no-op.
//!
//! # Failure Modes
//!
//! Container reads or writes that fail (after retries) end the current
//! momentum run and skip page-scroll interception for that move. No error
//! reaches the caller.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use web_time::{Duration, Instant};

use super::config::{TouchConfigOverrides, TouchGestureConfig};
use crate::container::{ListenerKind, ListenerOptions, ScrollBehavior, ScrollContainer, ScrollMetrics};
use crate::listener::ListenerGuard;
use crate::perf::retry::{RetryPolicy, retry_with_fallback};
use crate::schedule::{FrameId, Scheduler};

/// Momentum stops once `|velocity|` drops below this (px/ms).
pub const MOMENTUM_VELOCITY_FLOOR: f64 = 0.01;
/// Nominal frame length used to turn a px/ms velocity into a per-frame step.
pub const NOMINAL_FRAME_MS: f64 = 16.0;
/// A release this long after the last move carries no velocity.
pub const STALE_RELEASE: Duration = Duration::from_millis(100);
/// Distance from an edge that counts as "at the boundary" for interception,
/// matching the tracker's default `scroll_threshold`.
pub const DEFAULT_BOUNDARY_THRESHOLD: f64 = 5.0;

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl TouchPhase {
    #[must_use]
    pub const fn listener_kind(self) -> ListenerKind {
        match self {
            Self::Start => ListenerKind::TouchStart,
            Self::Move => ListenerKind::TouchMove,
            Self::End => ListenerKind::TouchEnd,
            Self::Cancel => ListenerKind::TouchCancel,
        }
    }
}

/// One touch sample (primary touch point only).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchInput {
    pub phase: TouchPhase,
    /// Client Y coordinate in CSS pixels.
    pub y: f64,
    pub at: Instant,
}

impl TouchInput {
    #[must_use]
    pub const fn new(phase: TouchPhase, y: f64, at: Instant) -> Self {
        Self { phase, y, at }
    }
}

/// Finger direction of the most recent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchDirection {
    Up,
    Down,
}

/// Ephemeral per-session touch tracking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouchState {
    pub is_active: bool,
    pub start_y: f64,
    pub last_y: f64,
    pub last_time: Option<Instant>,
    /// Signed px/ms, positive when the finger moves down.
    pub velocity: f64,
    pub direction: Option<TouchDirection>,
}

/// Inertial scrolling after release.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MomentumState {
    pub is_active: bool,
    /// Signed px/ms in the finger convention.
    pub velocity: f64,
    pub decay: f64,
    /// Distance pushed past a boundary so far (bounce only).
    pub overscroll: f64,
}

/// What the host should do with the native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchResponse {
    pub prevent_default: bool,
}

/// Touch handling for one container.
pub struct TouchGestureManager {
    container: Rc<dyn ScrollContainer>,
    scheduler: Rc<dyn Scheduler>,
    config: TouchGestureConfig,
    retry: RetryPolicy,
    boundary_threshold: f64,
    /// Passivity the current listeners were registered with.
    passive: bool,
    touch: TouchState,
    momentum: MomentumState,
    pending_frame: Option<FrameId>,
    listeners: Vec<ListenerGuard>,
    destroyed: bool,
}

impl fmt::Debug for TouchGestureManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchGestureManager")
            .field("config", &self.config)
            .field("passive", &self.passive)
            .field("touch", &self.touch)
            .field("momentum", &self.momentum)
            .field("pending_frame", &self.pending_frame)
            .field("listeners", &self.listeners.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl TouchGestureManager {
    /// Attach to `container`, registering the four touch listeners.
    #[must_use]
    pub fn new(
        container: Rc<dyn ScrollContainer>,
        scheduler: Rc<dyn Scheduler>,
        config: TouchGestureConfig,
    ) -> Self {
        let passive = config.listeners_passive();
        let listeners = attach_listeners(&container, passive);
        debug!(passive, "touch gesture manager attached");
        Self {
            container,
            scheduler,
            config,
            retry: RetryPolicy::default(),
            boundary_threshold: DEFAULT_BOUNDARY_THRESHOLD,
            passive,
            touch: TouchState::default(),
            momentum: MomentumState::default(),
            pending_frame: None,
            listeners,
            destroyed: false,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Use the tracker's boundary tolerance so both agree on where the edges are.
    #[must_use]
    pub fn with_boundary_threshold(mut self, threshold: f64) -> Self {
        self.boundary_threshold = if threshold.is_finite() {
            threshold.max(0.0)
        } else {
            DEFAULT_BOUNDARY_THRESHOLD
        };
        self
    }

    #[must_use]
    pub fn touch_state(&self) -> TouchState {
        self.touch
    }

    #[must_use]
    pub fn momentum_state(&self) -> MomentumState {
        self.momentum
    }

    /// A touch or momentum run is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.touch.is_active || self.momentum.is_active
    }

    #[must_use]
    pub fn config(&self) -> &TouchGestureConfig {
        &self.config
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the touch listeners are currently registered passive.
    #[must_use]
    pub fn listeners_passive(&self) -> bool {
        self.passive
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| l.is_attached()).count()
    }

    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }

    /// Merge new values into the live config. The four listeners are
    /// re-registered only when the merge changes their passivity.
    pub fn update_config(&mut self, overrides: &TouchConfigOverrides) {
        self.config = self.config.merged(overrides).sanitized();
        if self.momentum.is_active {
            self.momentum.decay = self.config.momentum_decay;
        }
        let passive = self.config.listeners_passive();
        if !self.destroyed && passive != self.passive {
            for listener in &mut self.listeners {
                listener.remove();
            }
            self.listeners = attach_listeners(&self.container, passive);
            self.passive = passive;
            debug!(passive, "touch listeners re-attached");
        }
        debug!(config = ?self.config, "touch config updated");
    }

    /// Feed a native touch event.
    pub fn handle(&mut self, input: TouchInput) -> TouchResponse {
        if self.destroyed {
            return TouchResponse::default();
        }
        match input.phase {
            TouchPhase::Start => {
                self.on_start(input);
                TouchResponse::default()
            }
            TouchPhase::Move => self.on_move(input),
            TouchPhase::End | TouchPhase::Cancel => {
                self.on_release(input);
                TouchResponse::default()
            }
        }
    }

    fn on_start(&mut self, input: TouchInput) {
        if self.momentum.is_active {
            debug!("touch start interrupts momentum");
            self.stop_momentum();
        }
        self.touch = TouchState {
            is_active: true,
            start_y: input.y,
            last_y: input.y,
            last_time: Some(input.at),
            velocity: 0.0,
            direction: None,
        };
        trace!(y = input.y, "touch start");
    }

    fn on_move(&mut self, input: TouchInput) -> TouchResponse {
        if !self.touch.is_active || !input.y.is_finite() {
            return TouchResponse::default();
        }
        let delta = input.y - self.touch.last_y;
        if let Some(last) = self.touch.last_time {
            let dt_ms = input.at.saturating_duration_since(last).as_secs_f64() * 1000.0;
            if dt_ms > 0.0 {
                self.touch.velocity = delta / dt_ms;
            }
        }
        if delta > 0.0 {
            self.touch.direction = Some(TouchDirection::Down);
        } else if delta < 0.0 {
            self.touch.direction = Some(TouchDirection::Up);
        }
        self.touch.last_y = input.y;
        self.touch.last_time = Some(input.at);
        trace!(y = input.y, velocity = self.touch.velocity, "touch move");

        // preventDefault is ignored on passive listeners.
        if self.passive || !self.config.prevent_page_scroll || delta == 0.0 {
            return TouchResponse::default();
        }
        let Some(metrics) = self.read_metrics() else {
            return TouchResponse::default();
        };
        let Some(direction) = self.touch.direction else {
            return TouchResponse::default();
        };
        if at_boundary(&metrics, direction, self.boundary_threshold) {
            // Let the page take over at the edge.
            return TouchResponse::default();
        }
        // The native scroll is suppressed along with the page's, so move the
        // menu ourselves.
        let target = metrics.scroll_top - delta * self.config.touch_sensitivity;
        let target = target.clamp(0.0, metrics.max_scroll_top());
        self.write_scroll(target);
        TouchResponse {
            prevent_default: true,
        }
    }

    fn on_release(&mut self, input: TouchInput) {
        if !self.touch.is_active {
            return;
        }
        let stale = self
            .touch
            .last_time
            .is_some_and(|last| input.at.saturating_duration_since(last) > STALE_RELEASE);
        let velocity = if stale { 0.0 } else { self.touch.velocity };
        let distance = (self.touch.last_y - self.touch.start_y).abs();
        self.touch = TouchState::default();

        if !self.config.momentum_enabled || !velocity.is_finite() {
            return;
        }
        let speed = velocity.abs();
        let fast = speed > self.config.momentum_threshold;
        let swipe = distance >= self.config.swipe_threshold
            && speed >= self.config.swipe_velocity_threshold;
        trace!(velocity, distance, fast, swipe, "touch release");
        if fast || swipe {
            self.start_momentum(velocity);
        }
    }

    fn start_momentum(&mut self, velocity: f64) {
        self.momentum = MomentumState {
            is_active: true,
            velocity,
            decay: self.config.momentum_decay,
            overscroll: 0.0,
        };
        debug!(velocity, decay = self.config.momentum_decay, "momentum started");
        self.schedule_frame();
    }

    fn schedule_frame(&mut self) {
        if let Some(old) = self.pending_frame.take() {
            self.scheduler.cancel_frame(old);
        }
        self.pending_frame = Some(self.scheduler.request_frame());
    }

    fn stop_momentum(&mut self) {
        if let Some(frame) = self.pending_frame.take() {
            self.scheduler.cancel_frame(frame);
        }
        if self.momentum.is_active {
            debug!(velocity = self.momentum.velocity, "momentum stopped");
        }
        self.momentum = MomentumState::default();
    }

    /// Advance momentum by one frame. Returns `false` if `frame` is not ours.
    pub fn on_frame(&mut self, frame: FrameId, _now: Instant) -> bool {
        if self.pending_frame != Some(frame) {
            return false;
        }
        self.pending_frame = None;
        if !self.momentum.is_active || self.destroyed {
            return true;
        }

        self.momentum.velocity *= self.momentum.decay;
        if self.momentum.velocity.abs() < MOMENTUM_VELOCITY_FLOOR {
            self.stop_momentum();
            return true;
        }

        let Some(metrics) = self.read_metrics() else {
            self.stop_momentum();
            return true;
        };
        let step = self.momentum.velocity * self.config.touch_sensitivity * NOMINAL_FRAME_MS;
        let max = metrics.max_scroll_top();
        let target = metrics.scroll_top - step;

        let excess = if target < 0.0 {
            -target
        } else if target > max {
            target - max
        } else {
            0.0
        };
        let clamped = target.clamp(0.0, max);
        if !self.write_scroll(clamped) {
            self.stop_momentum();
            return true;
        }

        if excess > 0.0 {
            if !self.config.bounce_enabled {
                self.stop_momentum();
                return true;
            }
            self.momentum.overscroll += excess;
            if self.momentum.overscroll >= self.config.bounce_distance {
                self.stop_momentum();
                return true;
            }
        }
        self.pending_frame = Some(self.scheduler.request_frame());
        true
    }

    fn read_metrics(&self) -> Option<ScrollMetrics> {
        retry_with_fallback(
            &self.retry,
            "touch.metrics",
            |_| self.container.metrics().map(Some),
            || None,
        )
    }

    fn write_scroll(&self, top: f64) -> bool {
        retry_with_fallback(
            &self.retry,
            "touch.scroll_to",
            |_| self.container.scroll_to(top, ScrollBehavior::Auto).map(|()| true),
            || false,
        )
    }

    /// Remove listeners and cancel any pending frame. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop_momentum();
        self.touch = TouchState::default();
        for listener in &mut self.listeners {
            listener.remove();
        }
        self.listeners.clear();
        self.destroyed = true;
        debug!("touch gesture manager destroyed");
    }
}

impl Drop for TouchGestureManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn attach_listeners(container: &Rc<dyn ScrollContainer>, passive: bool) -> Vec<ListenerGuard> {
    let options = ListenerOptions { passive };
    ListenerKind::TOUCH
        .iter()
        .map(|&kind| ListenerGuard::attach(container, kind, options))
        .collect()
}

/// Whether the content cannot move further in the direction the finger
/// pushes it. Same edges as `ScrollState::compute` with `threshold`.
fn at_boundary(metrics: &ScrollMetrics, direction: TouchDirection, threshold: f64) -> bool {
    let max = metrics.max_scroll_top();
    if max <= 0.0 {
        return true;
    }
    match direction {
        // Finger down pulls content toward its top.
        TouchDirection::Down => metrics.scroll_top <= threshold,
        TouchDirection::Up => metrics.scroll_top >= max - threshold,
    }
}
