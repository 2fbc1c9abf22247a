#![forbid(unsafe_code)]

//! Derived scroll snapshot for a menu container.
//!
//! [`ScrollState`] is recomputed from raw [`ScrollMetrics`] and replaced
//! wholesale; it is never patched field by field.
//!
//! # Invariants
//!
//! 1. When scrollable, exactly one of [`ScrollPosition::Top`],
//!    [`ScrollPosition::Middle`], [`ScrollPosition::Bottom`] holds.
//! 2. When not scrollable, `is_at_top` is true and every other flag is false.
//! 3. `scroll_percentage` is in `[0, 100]`, monotonically non-decreasing in
//!    `scroll_top`, and exactly `100.0` at the maximum scroll offset.

use serde::{Deserialize, Serialize};

use crate::container::ScrollMetrics;

/// Default boundary tolerance in pixels.
pub const DEFAULT_SCROLL_THRESHOLD: f64 = 5.0;

/// Coarse position within the scroll range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollPosition {
    Top,
    Middle,
    Bottom,
}

/// Recomputed scroll snapshot.
///
/// `Default` is the initial all-false/zero value used before any container is
/// attached. [`ScrollState::fallback`] is the safe value substituted when the
/// container cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
    pub is_scrollable: bool,
    pub can_scroll_up: bool,
    pub can_scroll_down: bool,
    pub scroll_percentage: f64,
    pub is_at_top: bool,
    pub is_at_bottom: bool,
}

impl ScrollState {
    /// Derive the snapshot for `metrics` with a boundary tolerance of
    /// `threshold` pixels. Negative or NaN thresholds count as zero.
    #[must_use]
    pub fn compute(metrics: ScrollMetrics, threshold: f64) -> Self {
        let threshold = threshold.max(0.0);
        let ScrollMetrics {
            scroll_top,
            scroll_height,
            client_height,
        } = metrics;

        // NaN heights compare false and land in the non-scrollable branch.
        let scrollable = scroll_height > client_height;
        if !scrollable {
            return Self {
                scroll_top,
                scroll_height,
                client_height,
                is_at_top: true,
                ..Self::default()
            };
        }

        let max = scroll_height - client_height;
        let top = scroll_top.clamp(0.0, max);
        let can_scroll_up = top > threshold;
        let can_scroll_down = top < max - threshold;
        let is_at_top = !can_scroll_up;

        Self {
            scroll_top,
            scroll_height,
            client_height,
            is_scrollable: true,
            can_scroll_up,
            can_scroll_down,
            scroll_percentage: (top / max * 100.0).clamp(0.0, 100.0),
            is_at_top,
            is_at_bottom: !can_scroll_down && !is_at_top,
        }
    }

    /// Safe state used when the container cannot be measured: not
    /// scrollable, resting at the top.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            is_at_top: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn position(&self) -> ScrollPosition {
        if self.is_at_top {
            ScrollPosition::Top
        } else if self.is_at_bottom {
            ScrollPosition::Bottom
        } else {
            ScrollPosition::Middle
        }
    }

    #[must_use]
    pub fn is_mid_scroll(&self) -> bool {
        self.position() == ScrollPosition::Middle
    }
}
