#![forbid(unsafe_code)]

//! Conversions between JS-facing strings and core types.

use menuscroll_core::container::ListenerKind;
use menuscroll_core::perf::PerformanceReport;
use menuscroll_core::{ScrollBehavior, ScrollState, TouchPhase};
use tracing::warn;

/// Media query for the reduced-motion preference.
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Window events that trigger a synchronous recompute.
pub const RESIZE_EVENT: &str = "resize";
pub const ORIENTATION_CHANGE_EVENT: &str = "orientationchange";

/// Parse a `scroll-behavior` keyword. Missing or unknown values mean smooth,
/// the imperative API's default.
#[must_use]
pub fn parse_behavior(value: Option<&str>) -> ScrollBehavior {
    match value {
        None | Some("smooth") => ScrollBehavior::Smooth,
        Some("auto") => ScrollBehavior::Auto,
        Some("instant") => ScrollBehavior::Instant,
        Some(other) => {
            warn!(value = other, "unknown scroll behavior, using smooth");
            ScrollBehavior::Smooth
        }
    }
}

/// Touch phase for a DOM event type, `None` for non-touch events.
#[must_use]
pub fn touch_phase(event_type: &str) -> Option<TouchPhase> {
    match ListenerKind::from_event_name(event_type)? {
        ListenerKind::TouchStart => Some(TouchPhase::Start),
        ListenerKind::TouchMove => Some(TouchPhase::Move),
        ListenerKind::TouchEnd => Some(TouchPhase::End),
        ListenerKind::TouchCancel => Some(TouchPhase::Cancel),
        ListenerKind::Scroll => None,
    }
}

/// camelCase JSON handed to `onScrollStateChange` listeners.
#[must_use]
pub fn state_json(state: &ScrollState) -> String {
    serde_json::to_string(state).unwrap_or_else(|err| {
        warn!(error = %err, "failed to serialize scroll state");
        String::from("{}")
    })
}

#[must_use]
pub fn performance_json(report: &PerformanceReport) -> String {
    serde_json::to_string(report).unwrap_or_else(|err| {
        warn!(error = %err, "failed to serialize performance report");
        String::from("{}")
    })
}
