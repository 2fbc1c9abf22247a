#![forbid(unsafe_code)]

//! Pure projection of [`ScrollState`] onto CSS classes and custom properties.
//!
//! The class list always starts with [`BASE_CLASS`]. `scrollable` and the
//! directional affordances are added only while the matching flag holds, so
//! the fade gradients and scrollbar thumb can be styled purely in CSS:
//!
//! ```css
//! .mobile-menu-scroll.can-scroll-down::after { opacity: 1; }
//! .mobile-menu-scroll .thumb {
//!   height: var(--scroll-thumb-size);
//!   top: var(--scroll-thumb-offset);
//! }
//! ```

use bitflags::bitflags;

use crate::state::ScrollState;

/// Marker class carried by every projected container.
pub const BASE_CLASS: &str = "mobile-menu-scroll";

bitflags! {
    /// Visual affordances active for a scroll snapshot.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IndicatorFlags: u8 {
        const SCROLLABLE      = 0b0_0001;
        const CAN_SCROLL_UP   = 0b0_0010;
        const CAN_SCROLL_DOWN = 0b0_0100;
        const AT_TOP          = 0b0_1000;
        const AT_BOTTOM       = 0b1_0000;
    }
}

impl IndicatorFlags {
    #[must_use]
    pub fn from_state(state: &ScrollState) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::SCROLLABLE, state.is_scrollable);
        flags.set(Self::CAN_SCROLL_UP, state.can_scroll_up);
        flags.set(Self::CAN_SCROLL_DOWN, state.can_scroll_down);
        flags.set(Self::AT_TOP, state.is_at_top);
        flags.set(Self::AT_BOTTOM, state.is_at_bottom);
        flags
    }
}

/// Projected classes and custom properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollIndicators {
    pub flags: IndicatorFlags,
    pub classes: Vec<&'static str>,
    pub custom_properties: Vec<(&'static str, String)>,
}

impl ScrollIndicators {
    /// Space-separated `class` attribute value.
    #[must_use]
    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    /// `style` attribute value declaring every custom property.
    #[must_use]
    pub fn style_text(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.custom_properties {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push(';');
        }
        out
    }

    #[must_use]
    pub fn custom_property(&self, name: &str) -> Option<&str> {
        self.custom_properties
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(&class)
    }
}

fn px(value: f64) -> String {
    format!("{}px", round2(value))
}

fn pct(value: f64) -> String {
    format!("{}%", round2(value))
}

fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// Project a snapshot. Pure: same input, same output.
#[must_use]
pub fn project(state: &ScrollState) -> ScrollIndicators {
    let flags = IndicatorFlags::from_state(state);

    let mut classes = Vec::with_capacity(4);
    classes.push(BASE_CLASS);
    if flags.contains(IndicatorFlags::SCROLLABLE) {
        classes.push("scrollable");
    }
    if flags.contains(IndicatorFlags::CAN_SCROLL_UP) {
        classes.push("can-scroll-up");
    }
    if flags.contains(IndicatorFlags::CAN_SCROLL_DOWN) {
        classes.push("can-scroll-down");
    }

    // Thumb: visible fraction of the content, positioned over the free track.
    let (thumb_size, thumb_offset) = if state.is_scrollable && state.scroll_height > 0.0 {
        let size = (state.client_height / state.scroll_height * 100.0).clamp(0.0, 100.0);
        (size, (100.0 - size) * state.scroll_percentage / 100.0)
    } else {
        (100.0, 0.0)
    };

    let custom_properties = vec![
        ("--scroll-percentage", pct(state.scroll_percentage)),
        ("--scroll-top", px(state.scroll_top)),
        ("--scroll-height", px(state.scroll_height)),
        ("--client-height", px(state.client_height)),
        ("--scroll-thumb-size", pct(thumb_size)),
        ("--scroll-thumb-offset", pct(thumb_offset)),
    ];

    ScrollIndicators {
        flags,
        classes,
        custom_properties,
    }
}
