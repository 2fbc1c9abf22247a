#![forbid(unsafe_code)]

//! Top-level configuration for one menu.
//!
//! Groups every tunable into a single [`MenuScrollConfig`] that the web host
//! passes as JSON. Every field is optional in the JSON form; missing fields
//! take the defaults below.
//!
//! ```json
//! {
//!   "tracker": { "scrollThreshold": 8, "debounceMs": 150 },
//!   "touch": { "bounceEnabled": true },
//!   "performance": { "sampleWindow": 20 },
//!   "retry": { "maxRetries": 1 }
//! }
//! ```
//!
//! # Defaults
//!
//! | Section       | Field                    | Default |
//! |---------------|--------------------------|---------|
//! | `tracker`     | `scrollThreshold`        | 5.0     |
//! | `tracker`     | `debounceMs`             | 100     |
//! | `tracker`     | `announceScrollState`    | true    |
//! | `tracker`     | `performanceMonitoring`  | true    |
//! | `touch`       | (overrides)              | none    |
//! | `performance` | `sampleWindow`           | 30      |
//! | `performance` | `minFps`                 | 30.0    |
//! | `retry`       | `maxRetries`             | 2       |

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::perf::frame_monitor::FrameMonitorConfig;
use crate::perf::retry::RetryPolicy;
use crate::touch::{TouchConfigOverrides, TouchGestureConfig};
use crate::tracker::ScrollTrackerConfig;

/// Everything a [`MenuScrollController`](crate::controller::MenuScrollController) needs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuScrollConfig {
    pub tracker: ScrollTrackerConfig,
    /// Caller overrides, applied on top of platform tuning.
    pub touch: TouchConfigOverrides,
    pub performance: FrameMonitorConfig,
    pub retry: RetryPolicy,
}

impl MenuScrollConfig {
    /// Parse from JSON. Values are not range-checked here; see
    /// [`sanitized`](Self::sanitized) and [`validate`](Self::validate).
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse leniently: malformed JSON falls back to defaults, out-of-range
    /// values are replaced. Never fails.
    #[must_use]
    pub fn from_json_lenient(s: &str) -> Self {
        match Self::from_json_str(s) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                warn!(error = %err, "unparseable menu scroll config, using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Replace invalid values with defaults, logging each replacement.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.tracker = self.tracker.sanitized();
        let defaults = FrameMonitorConfig::default();
        if !(self.performance.min_fps.is_finite() && self.performance.min_fps > 0.0) {
            warn!(
                value = self.performance.min_fps,
                "invalid performance.min_fps, using default"
            );
            self.performance.min_fps = defaults.min_fps;
        }
        if self.performance.sample_window < 2 {
            warn!(
                value = self.performance.sample_window,
                "performance.sample_window below 2, using default"
            );
            self.performance.sample_window = defaults.sample_window;
        }
        self
    }

    /// Strict check. Touch overrides are validated as resolved against the
    /// library defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.tracker.scroll_threshold;
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(ConfigError::invalid(
                "tracker.scroll_threshold",
                format!("{threshold} must be a non-negative number"),
            ));
        }
        let min_fps = self.performance.min_fps;
        if !(min_fps.is_finite() && min_fps > 0.0) {
            return Err(ConfigError::invalid(
                "performance.min_fps",
                format!("{min_fps} must be positive"),
            ));
        }
        if self.performance.sample_window < 2 {
            return Err(ConfigError::invalid(
                "performance.sample_window",
                "at least 2 frames are needed to measure a rate",
            ));
        }
        TouchGestureConfig::default().merged(&self.touch).validate()
    }
}
