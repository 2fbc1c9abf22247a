#![forbid(unsafe_code)]

//! Assistive-technology hooks: live-region announcements and the
//! reduced-motion preference.

use serde::{Deserialize, Serialize};

/// Announced once when a scrollable menu is attached.
pub const SCROLLABLE_MESSAGE: &str =
    "Menu is scrollable. Swipe up or down to see more options.";
pub const REACHED_TOP_MESSAGE: &str = "Reached top of menu.";
pub const REACHED_BOTTOM_MESSAGE: &str = "Reached bottom of menu.";

/// `aria-live` urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Politeness {
    #[default]
    Polite,
    Assertive,
}

impl Politeness {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

/// Live-region updater owned by the host page.
pub trait Announcer {
    fn announce(&self, message: &str, politeness: Politeness);
}

/// Source of the `prefers-reduced-motion` signal.
///
/// Queried at every scroll call so a preference flip applies immediately.
pub trait MotionPreference {
    fn prefers_reduced_motion(&self) -> bool;
}

/// Fixed preference, for hosts without a media-query signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaticMotion(pub bool);

impl MotionPreference for StaticMotion {
    fn prefers_reduced_motion(&self) -> bool {
        self.0
    }
}

/// Announcer that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn announce(&self, _message: &str, _politeness: Politeness) {}
}
