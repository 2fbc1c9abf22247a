#![forbid(unsafe_code)]

//! Core: scroll state, touch momentum, and indicator projection for mobile
//! navigation menus.
//!
//! # Role in menuscroll
//! `menuscroll-core` is host-agnostic. Every component is driven by explicit
//! [`web_time::Instant`] timestamps and talks to the page only through the
//! traits in [`container`], [`schedule`], and [`a11y`]. `menuscroll-web`
//! implements those traits over the DOM; [`headless`] implements them in
//! memory for tests and non-browser hosts.
//!
//! # Primary responsibilities
//! - **ScrollTracker**: boundary/percentage state, debounced recomputation,
//!   and boundary announcements.
//! - **TouchGestureManager**: velocity tracking, page-scroll interception,
//!   and momentum after release.
//! - **Indicators**: pure projection of state to CSS classes and custom
//!   properties.
//! - **Perf utilities**: debounce, listener cleanup guards, bounded retry,
//!   and a frame-rate monitor.
//!
//! # How it fits together
//! [`MenuScrollController`] owns one tracker and one gesture manager bound to
//! the same container, routes [`HostEvent`]s to them, and tears both down in
//! [`MenuScrollController::destroy`].

pub mod a11y;
pub mod config;
pub mod container;
pub mod controller;
pub mod error;
pub mod headless;
pub mod host;
pub mod indicators;
pub mod listener;
pub mod perf;
pub mod schedule;
pub mod state;
pub mod touch;
pub mod tracker;

#[cfg(feature = "tracing-json")]
pub mod logging;

pub use a11y::{Announcer, MotionPreference, Politeness};
pub use config::MenuScrollConfig;
pub use container::{ListenerKind, ListenerOptions, ScrollBehavior, ScrollContainer, ScrollMetrics};
pub use controller::{EventResponse, HostEvent, MenuScrollController};
pub use error::{ConfigError, ContainerError};
pub use host::HostServices;
pub use indicators::{IndicatorFlags, ScrollIndicators};
pub use listener::ListenerGuard;
pub use schedule::{FrameId, Scheduler, TimerId};
pub use state::{ScrollPosition, ScrollState};
pub use touch::{Platform, TouchConfigOverrides, TouchGestureConfig, TouchInput, TouchPhase};
pub use tracker::{ScrollTracker, ScrollTrackerConfig, SubscriptionId};
