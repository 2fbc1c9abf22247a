#![forbid(unsafe_code)]

//! Host abstraction over a scrollable menu container.
//!
//! The core never touches the DOM directly. A host (the wasm binding, or the
//! [`headless`](crate::headless) in-memory host) implements [`ScrollContainer`]
//! and feeds native events back through
//! [`MenuScrollController::handle`](crate::controller::MenuScrollController::handle).
//!
//! Methods take `&self`: the underlying element is interior-mutable and is
//! shared (via `Rc`) between the tracker and the gesture manager.

use serde::{Deserialize, Serialize};

use crate::error::ContainerError;

/// Raw scroll geometry read from a container, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    #[must_use]
    pub const fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Build metrics, rejecting NaN and infinite values.
    pub fn checked(
        scroll_top: f64,
        scroll_height: f64,
        client_height: f64,
    ) -> Result<Self, ContainerError> {
        for (property, value) in [
            ("scrollTop", scroll_top),
            ("scrollHeight", scroll_height),
            ("clientHeight", client_height),
        ] {
            if !value.is_finite() {
                return Err(ContainerError::NonFinite { property, value });
            }
        }
        Ok(Self::new(scroll_top, scroll_height, client_height))
    }

    /// Largest legal `scroll_top` (0 when content fits).
    #[must_use]
    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// Scroll animation mode passed to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    /// Jump immediately.
    #[default]
    Auto,
    Smooth,
    Instant,
}

impl ScrollBehavior {
    /// DOM `ScrollBehavior` string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Smooth => "smooth",
            Self::Instant => "instant",
        }
    }

    /// Apply the reduced-motion override: any animated behavior collapses to
    /// [`ScrollBehavior::Auto`].
    #[must_use]
    pub const fn respecting_motion(self, reduced_motion: bool) -> Self {
        if reduced_motion { Self::Auto } else { self }
    }
}

/// Native events a component may listen to on the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerKind {
    Scroll,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
}

impl ListenerKind {
    pub const TOUCH: [Self; 4] = [
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
        Self::TouchCancel,
    ];

    /// DOM event type name.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::TouchCancel => "touchcancel",
        }
    }

    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "scroll" => Some(Self::Scroll),
            "touchstart" => Some(Self::TouchStart),
            "touchmove" => Some(Self::TouchMove),
            "touchend" => Some(Self::TouchEnd),
            "touchcancel" => Some(Self::TouchCancel),
            _ => None,
        }
    }
}

/// Registration options for a container listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
    /// Hint that the listener never prevents default.
    pub passive: bool,
}

impl ListenerOptions {
    pub const PASSIVE: Self = Self { passive: true };
    pub const ACTIVE: Self = Self { passive: false };
}

/// Host-assigned listener registration id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// A scrollable element owned by one tracker/gesture-manager pair.
pub trait ScrollContainer {
    /// Read the current geometry. Implementations report access failures and
    /// non-finite values as errors instead of panicking.
    fn metrics(&self) -> Result<ScrollMetrics, ContainerError>;

    /// Scroll to an absolute `scroll_top`.
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) -> Result<(), ContainerError>;

    /// Register a listener for `kind`; the host routes the native event back
    /// to the controller.
    fn add_listener(&self, kind: ListenerKind, options: ListenerOptions) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}
