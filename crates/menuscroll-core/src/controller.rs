#![forbid(unsafe_code)]

//! One menu's scroll subsystem: a [`ScrollTracker`] and a
//! [`TouchGestureManager`] bound to the same container.
//!
//! The host forwards every native event, timer, and animation frame as a
//! [`HostEvent`]; the controller routes it and answers with an
//! [`EventResponse`] telling the host whether to call `preventDefault`.
//!
//! ```
//! use menuscroll_core::controller::{HostEvent, MenuScrollController};
//! use menuscroll_core::headless::{HeadlessContainer, ManualScheduler};
//! use menuscroll_core::{HostServices, MenuScrollConfig, Platform};
//! use web_time::Instant;
//!
//! let host = HeadlessContainer::new(800.0, 400.0);
//! let scheduler = ManualScheduler::new();
//! let mut menu = MenuScrollController::new(
//!     MenuScrollConfig::default(),
//!     HostServices::with_scheduler(scheduler.clone()),
//!     Platform::Unknown,
//! );
//! menu.set_container(Some(host.clone()));
//! assert!(menu.state().is_at_top);
//!
//! host.set_scroll_top(400.0);
//! menu.handle(HostEvent::Resize { at: Instant::now() });
//! assert!(menu.state().is_at_bottom);
//! assert!(menu.indicators().has_class("can-scroll-up"));
//! ```

use std::rc::Rc;

use tracing::{debug, warn};
use web_time::Instant;

use crate::config::MenuScrollConfig;
use crate::container::{ScrollBehavior, ScrollContainer};
use crate::host::HostServices;
use crate::indicators::ScrollIndicators;
use crate::perf::frame_monitor::PerformanceReport;
use crate::schedule::{FrameId, TimerId};
use crate::state::ScrollState;
use crate::touch::{
    MomentumState, Platform, TouchConfigOverrides, TouchGestureConfig, TouchGestureManager,
    TouchInput, TouchState,
};
use crate::tracker::{ScrollTracker, SubscriptionId};

/// Input delivered by the host event loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Native `scroll` on the container.
    Scroll { at: Instant },
    Touch(TouchInput),
    Resize { at: Instant },
    OrientationChange { at: Instant },
    Timer { id: TimerId, at: Instant },
    Frame { id: FrameId, at: Instant },
}

/// What the host should do with the native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    pub prevent_default: bool,
}

/// Scroll tracking and touch handling for one menu.
#[derive(Debug)]
pub struct MenuScrollController {
    config: MenuScrollConfig,
    touch_config: TouchGestureConfig,
    platform: Platform,
    services: HostServices,
    tracker: ScrollTracker,
    gestures: Option<TouchGestureManager>,
    destroyed: bool,
}

impl MenuScrollController {
    /// Build with `config` layered over the tuning for `platform`.
    #[must_use]
    pub fn new(config: MenuScrollConfig, services: HostServices, platform: Platform) -> Self {
        let config = config.sanitized();
        let touch_config = TouchGestureConfig::resolve(platform.overrides(), config.touch);
        let tracker = ScrollTracker::new(config.tracker, services.clone())
            .with_retry(config.retry)
            .with_frame_monitor(config.performance);
        debug!(platform = platform.as_str(), "menu scroll controller created");
        Self {
            config,
            touch_config,
            platform,
            services,
            tracker,
            gestures: None,
            destroyed: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MenuScrollConfig {
        &self.config
    }

    /// Touch config after platform and caller layering.
    #[must_use]
    pub fn touch_config(&self) -> &TouchGestureConfig {
        &self.touch_config
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Bind to `container`, replacing any previous one, or unbind with `None`.
    pub fn set_container(&mut self, container: Option<Rc<dyn ScrollContainer>>) {
        if self.destroyed {
            warn!("set_container on a destroyed menu scroll controller");
            return;
        }
        if let Some(mut old) = self.gestures.take() {
            old.destroy();
        }
        if let Some(container) = container.as_ref() {
            let manager = TouchGestureManager::new(
                Rc::clone(container),
                Rc::clone(&self.services.scheduler),
                self.touch_config,
            )
            .with_retry(self.config.retry)
            .with_boundary_threshold(self.config.tracker.scroll_threshold);
            self.gestures = Some(manager);
        }
        self.tracker.set_container(container);
    }

    #[must_use]
    pub fn has_container(&self) -> bool {
        self.tracker.has_container()
    }

    /// Route one host event.
    pub fn handle(&mut self, event: HostEvent) -> EventResponse {
        if self.destroyed {
            return EventResponse::default();
        }
        match event {
            HostEvent::Scroll { at } => self.tracker.handle_scroll(at),
            HostEvent::Touch(input) => {
                if let Some(gestures) = self.gestures.as_mut() {
                    let response = gestures.handle(input);
                    return EventResponse {
                        prevent_default: response.prevent_default,
                    };
                }
            }
            HostEvent::Resize { .. } | HostEvent::OrientationChange { .. } => {
                self.tracker.update_scroll_state();
            }
            HostEvent::Timer { id, at } => {
                self.tracker.on_timer(id, at);
            }
            HostEvent::Frame { id, at } => {
                let claimed = self
                    .gestures
                    .as_mut()
                    .is_some_and(|g| g.on_frame(id, at));
                if !claimed {
                    self.tracker.on_frame(id, at);
                }
            }
        }
        EventResponse::default()
    }

    #[must_use]
    pub fn state(&self) -> ScrollState {
        self.tracker.state()
    }

    #[must_use]
    pub fn indicators(&self) -> ScrollIndicators {
        self.tracker.indicators()
    }

    #[must_use]
    pub fn touch_state(&self) -> TouchState {
        self.gestures
            .as_ref()
            .map(TouchGestureManager::touch_state)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn momentum_state(&self) -> MomentumState {
        self.gestures
            .as_ref()
            .map(TouchGestureManager::momentum_state)
            .unwrap_or_default()
    }

    pub fn on_scroll_state_change(
        &mut self,
        callback: impl FnMut(&ScrollState) + 'static,
    ) -> SubscriptionId {
        self.tracker.on_scroll_state_change(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.tracker.unsubscribe(id)
    }

    pub fn on_performance_degraded(&mut self, callback: impl FnMut(&PerformanceReport) + 'static) {
        self.tracker.on_performance_degraded(callback);
    }

    pub fn update_scroll_state(&mut self) {
        if !self.destroyed {
            self.tracker.update_scroll_state();
        }
    }

    /// Merge touch overrides into the live gesture config.
    pub fn update_touch_config(&mut self, overrides: &TouchConfigOverrides) {
        self.touch_config = self.touch_config.merged(overrides).sanitized();
        self.config.touch = self.config.touch.then(*overrides);
        if let Some(gestures) = self.gestures.as_mut() {
            gestures.update_config(overrides);
        }
    }

    pub fn scroll_to(&self, position: f64, behavior: ScrollBehavior) {
        self.tracker.scroll_to(position, behavior);
    }

    pub fn scroll_to_top(&self) {
        self.tracker.scroll_to_top();
    }

    pub fn scroll_to_bottom(&self) {
        self.tracker.scroll_to_bottom();
    }

    pub fn scroll_by(&self, delta: f64) {
        self.tracker.scroll_by(delta);
    }

    /// Release every listener, timer, and frame. Idempotent; the controller
    /// ignores all further input.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(mut gestures) = self.gestures.take() {
            gestures.destroy();
        }
        self.tracker.set_container(None);
        self.destroyed = true;
        debug!("menu scroll controller destroyed");
    }
}

impl Drop for MenuScrollController {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessContainer, ManualScheduler};
    use crate::touch::TouchPhase;
    use web_time::Duration;

    fn controller(platform: Platform) -> (Rc<HeadlessContainer>, Rc<ManualScheduler>, MenuScrollController) {
        let host = HeadlessContainer::new(2000.0, 400.0);
        let scheduler = ManualScheduler::new();
        let mut menu = MenuScrollController::new(
            MenuScrollConfig::default(),
            HostServices::with_scheduler(scheduler.clone()),
            platform,
        );
        menu.set_container(Some(host.clone()));
        (host, scheduler, menu)
    }

    #[test]
    fn binds_scroll_and_touch_listeners() {
        let (host, _, menu) = controller(Platform::Unknown);
        assert_eq!(host.listener_count(), 5);
        assert!(menu.has_container());
    }

    #[test]
    fn platform_tuning_is_layered_under_caller() {
        let host = HeadlessContainer::new(2000.0, 400.0);
        let config = MenuScrollConfig {
            touch: TouchConfigOverrides {
                momentum_decay: Some(0.9),
                ..TouchConfigOverrides::default()
            },
            ..MenuScrollConfig::default()
        };
        let mut menu = MenuScrollController::new(
            config,
            HostServices::with_scheduler(ManualScheduler::new()),
            Platform::Ios,
        );
        menu.set_container(Some(host));
        assert!(menu.touch_config().bounce_enabled);
        assert_eq!(menu.touch_config().momentum_decay, 0.9);
    }

    #[test]
    fn touch_response_reaches_host() {
        let (host, _, mut menu) = controller(Platform::Unknown);
        host.set_scroll_top(300.0);
        let t0 = Instant::now();
        menu.handle(HostEvent::Touch(TouchInput::new(TouchPhase::Start, 200.0, t0)));
        let response = menu.handle(HostEvent::Touch(TouchInput::new(
            TouchPhase::Move,
            180.0,
            t0 + Duration::from_millis(16),
        )));
        assert!(response.prevent_default);
        assert!(menu.touch_state().is_active);
    }

    #[test]
    fn gesture_boundary_follows_tracker_threshold() {
        let host = HeadlessContainer::new(2000.0, 400.0);
        let mut config = MenuScrollConfig::default();
        config.tracker.scroll_threshold = 20.0;
        let mut menu = MenuScrollController::new(
            config,
            HostServices::with_scheduler(ManualScheduler::new()),
            Platform::Unknown,
        );
        menu.set_container(Some(host.clone()));
        host.set_scroll_top(15.0);
        menu.update_scroll_state();
        assert!(menu.state().is_at_top);

        let t0 = Instant::now();
        menu.handle(HostEvent::Touch(TouchInput::new(TouchPhase::Start, 200.0, t0)));
        let response = menu.handle(HostEvent::Touch(TouchInput::new(
            TouchPhase::Move,
            210.0,
            t0 + Duration::from_millis(16),
        )));
        assert!(!response.prevent_default);
        assert_eq!(host.scroll_top(), 15.0);
    }

    #[test]
    fn frames_route_to_their_owner() {
        let (host, scheduler, mut menu) = controller(Platform::Unknown);
        host.set_scroll_top(1000.0);
        let t0 = Instant::now();
        // Tracker monitor frame first, then a momentum frame.
        menu.handle(HostEvent::Scroll { at: t0 });
        menu.handle(HostEvent::Touch(TouchInput::new(TouchPhase::Start, 400.0, t0)));
        menu.handle(HostEvent::Touch(TouchInput::new(
            TouchPhase::Move,
            380.0,
            t0 + Duration::from_millis(10),
        )));
        menu.handle(HostEvent::Touch(TouchInput::new(
            TouchPhase::End,
            380.0,
            t0 + Duration::from_millis(12),
        )));
        assert_eq!(scheduler.pending_frames(), 2);
        let before = host.scroll_top();
        while let Some(id) = scheduler.take_frame() {
            menu.handle(HostEvent::Frame {
                id,
                at: t0 + Duration::from_millis(30),
            });
            if !menu.momentum_state().is_active {
                break;
            }
        }
        assert!(host.scroll_top() > before);
    }

    #[test]
    fn destroy_is_terminal() {
        let (host, scheduler, mut menu) = controller(Platform::Unknown);
        menu.handle(HostEvent::Scroll { at: Instant::now() });
        menu.destroy();
        menu.destroy();
        assert_eq!(host.listener_count(), 0);
        assert_eq!(scheduler.pending_timers(), 0);
        assert_eq!(scheduler.pending_frames(), 0);

        menu.set_container(Some(host.clone()));
        assert_eq!(host.listener_count(), 0);
        assert_eq!(
            menu.handle(HostEvent::Resize { at: Instant::now() }),
            EventResponse::default()
        );
    }
}
