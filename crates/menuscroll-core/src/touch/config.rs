#![forbid(unsafe_code)]

//! Touch gesture tuning and override merging.
//!
//! The effective [`TouchGestureConfig`] is layered, lowest precedence first:
//!
//! 1. library defaults ([`TouchGestureConfig::default`]),
//! 2. platform overrides ([`Platform::overrides`](super::platform::Platform::overrides)),
//! 3. caller overrides.
//!
//! Each layer is a [`TouchConfigOverrides`] where `None` means "inherit".
//!
//! # Defaults
//!
//! | Setting | Default | Unit |
//! |---------|---------|------|
//! | `prevent_page_scroll` | true | |
//! | `momentum_enabled` | true | |
//! | `momentum_decay` | 0.95 | per frame, in (0, 1) |
//! | `momentum_threshold` | 0.5 | px/ms |
//! | `bounce_enabled` | false | |
//! | `bounce_distance` | 50 | px |
//! | `touch_sensitivity` | 1.0 | multiplier |
//! | `swipe_threshold` | 50 | px |
//! | `swipe_velocity_threshold` | 0.3 | px/ms |
//! | `passive_listeners` | false | |

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Fully-resolved touch gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TouchGestureConfig {
    /// Stop the page behind the menu from scrolling while the menu can.
    pub prevent_page_scroll: bool,
    pub momentum_enabled: bool,
    /// Per-frame velocity multiplier during momentum.
    pub momentum_decay: f64,
    /// Release speed (px/ms) above which momentum starts.
    pub momentum_threshold: f64,
    pub bounce_enabled: bool,
    /// Maximum momentum travel past a boundary when bounce is enabled.
    pub bounce_distance: f64,
    /// Multiplier applied to finger deltas and momentum steps.
    pub touch_sensitivity: f64,
    /// Minimum gesture distance (px) for a swipe.
    pub swipe_threshold: f64,
    /// Minimum release speed (px/ms) for a swipe.
    pub swipe_velocity_threshold: f64,
    /// Allow passive touch listeners when page-scroll prevention is off.
    pub passive_listeners: bool,
}

impl Default for TouchGestureConfig {
    fn default() -> Self {
        Self {
            prevent_page_scroll: true,
            momentum_enabled: true,
            momentum_decay: 0.95,
            momentum_threshold: 0.5,
            bounce_enabled: false,
            bounce_distance: 50.0,
            touch_sensitivity: 1.0,
            swipe_threshold: 50.0,
            swipe_velocity_threshold: 0.3,
            passive_listeners: false,
        }
    }
}

/// Partial config layer; `None` inherits from the layer below.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TouchConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevent_page_scroll: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum_decay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounce_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounce_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub touch_sensitivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_velocity_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passive_listeners: Option<bool>,
}

impl TouchConfigOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer `other` on top of `self` (`other` wins where set).
    #[must_use]
    pub fn then(self, other: Self) -> Self {
        Self {
            prevent_page_scroll: other.prevent_page_scroll.or(self.prevent_page_scroll),
            momentum_enabled: other.momentum_enabled.or(self.momentum_enabled),
            momentum_decay: other.momentum_decay.or(self.momentum_decay),
            momentum_threshold: other.momentum_threshold.or(self.momentum_threshold),
            bounce_enabled: other.bounce_enabled.or(self.bounce_enabled),
            bounce_distance: other.bounce_distance.or(self.bounce_distance),
            touch_sensitivity: other.touch_sensitivity.or(self.touch_sensitivity),
            swipe_threshold: other.swipe_threshold.or(self.swipe_threshold),
            swipe_velocity_threshold: other
                .swipe_velocity_threshold
                .or(self.swipe_velocity_threshold),
            passive_listeners: other.passive_listeners.or(self.passive_listeners),
        }
    }
}

fn valid_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn valid_decay(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value < 1.0
}

fn valid_sensitivity(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl TouchGestureConfig {
    /// Resolve defaults → `platform` → `caller`, then sanitize.
    #[must_use]
    pub fn resolve(platform: TouchConfigOverrides, caller: TouchConfigOverrides) -> Self {
        Self::default().merged(&platform.then(caller)).sanitized()
    }

    /// Apply an override layer without sanitizing.
    #[must_use]
    pub fn merged(&self, overrides: &TouchConfigOverrides) -> Self {
        Self {
            prevent_page_scroll: overrides
                .prevent_page_scroll
                .unwrap_or(self.prevent_page_scroll),
            momentum_enabled: overrides.momentum_enabled.unwrap_or(self.momentum_enabled),
            momentum_decay: overrides.momentum_decay.unwrap_or(self.momentum_decay),
            momentum_threshold: overrides
                .momentum_threshold
                .unwrap_or(self.momentum_threshold),
            bounce_enabled: overrides.bounce_enabled.unwrap_or(self.bounce_enabled),
            bounce_distance: overrides.bounce_distance.unwrap_or(self.bounce_distance),
            touch_sensitivity: overrides
                .touch_sensitivity
                .unwrap_or(self.touch_sensitivity),
            swipe_threshold: overrides.swipe_threshold.unwrap_or(self.swipe_threshold),
            swipe_velocity_threshold: overrides
                .swipe_velocity_threshold
                .unwrap_or(self.swipe_velocity_threshold),
            passive_listeners: overrides
                .passive_listeners
                .unwrap_or(self.passive_listeners),
        }
    }

    /// Replace out-of-range values with their defaults, logging each one.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |field: &'static str, value: &mut f64, ok: bool, fallback: f64| {
            if !ok {
                warn!(field, value = *value, fallback, "invalid touch config value, using default");
                *value = fallback;
            }
        };
        let decay_ok = valid_decay(self.momentum_decay);
        fix("momentum_decay", &mut self.momentum_decay, decay_ok, defaults.momentum_decay);
        let ok = valid_non_negative(self.momentum_threshold);
        fix("momentum_threshold", &mut self.momentum_threshold, ok, defaults.momentum_threshold);
        let ok = valid_non_negative(self.bounce_distance);
        fix("bounce_distance", &mut self.bounce_distance, ok, defaults.bounce_distance);
        let ok = valid_sensitivity(self.touch_sensitivity);
        fix("touch_sensitivity", &mut self.touch_sensitivity, ok, defaults.touch_sensitivity);
        let ok = valid_non_negative(self.swipe_threshold);
        fix("swipe_threshold", &mut self.swipe_threshold, ok, defaults.swipe_threshold);
        let ok = valid_non_negative(self.swipe_velocity_threshold);
        fix(
            "swipe_velocity_threshold",
            &mut self.swipe_velocity_threshold,
            ok,
            defaults.swipe_velocity_threshold,
        );
        self
    }

    /// Strict check for hosts that prefer rejecting bad input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !valid_decay(self.momentum_decay) {
            return Err(ConfigError::invalid(
                "momentum_decay",
                format!("{} is outside (0, 1)", self.momentum_decay),
            ));
        }
        if !valid_sensitivity(self.touch_sensitivity) {
            return Err(ConfigError::invalid(
                "touch_sensitivity",
                format!("{} must be positive", self.touch_sensitivity),
            ));
        }
        for (field, value) in [
            ("momentum_threshold", self.momentum_threshold),
            ("bounce_distance", self.bounce_distance),
            ("swipe_threshold", self.swipe_threshold),
            ("swipe_velocity_threshold", self.swipe_velocity_threshold),
        ] {
            if !valid_non_negative(value) {
                return Err(ConfigError::invalid(
                    field,
                    format!("{value} must be a non-negative number"),
                ));
            }
        }
        Ok(())
    }

    /// Whether touch listeners may be registered passive. Page-scroll
    /// prevention needs `preventDefault`, so it always forces active listeners.
    #[must_use]
    pub fn listeners_passive(&self) -> bool {
        self.passive_listeners && !self.prevent_page_scroll
    }
}
