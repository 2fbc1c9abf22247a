#![forbid(unsafe_code)]

//! Platform detection for touch tuning.
//!
//! User-agent sniffing is brittle, so it lives behind one function,
//! [`Platform::detect`], that returns a tagged variant. Gesture logic only
//! ever sees the resulting [`TouchConfigOverrides`].
//!
//! Matching order matters: iOS and Android user agents both contain
//! `Safari`, so they are checked before desktop Safari.

use super::config::TouchConfigOverrides;

/// Platform family relevant to touch behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Ios,
    Android,
    /// Desktop Safari (touch-capable Macs, iPadOS in desktop mode).
    SafariDesktop,
    Unknown,
}

const IOS_MARKERS: [&str; 3] = ["iPhone", "iPad", "iPod"];
/// Engines whose UA also carries `Safari` but are not Safari.
const NON_SAFARI_MARKERS: [&str; 6] = ["Chrome", "Chromium", "CriOS", "FxiOS", "Edg", "OPR"];

impl Platform {
    #[must_use]
    pub fn detect(user_agent: &str) -> Self {
        if IOS_MARKERS.iter().any(|m| user_agent.contains(m)) {
            return Self::Ios;
        }
        if user_agent.contains("Android") {
            return Self::Android;
        }
        if user_agent.contains("Safari")
            && !NON_SAFARI_MARKERS.iter().any(|m| user_agent.contains(m))
        {
            return Self::SafariDesktop;
        }
        Self::Unknown
    }

    /// Config deltas for this platform. [`Platform::Unknown`] is empty.
    #[must_use]
    pub fn overrides(self) -> TouchConfigOverrides {
        match self {
            Self::Ios => TouchConfigOverrides {
                momentum_decay: Some(0.96),
                bounce_enabled: Some(true),
                touch_sensitivity: Some(1.0),
                ..TouchConfigOverrides::default()
            },
            Self::Android => TouchConfigOverrides {
                momentum_decay: Some(0.92),
                touch_sensitivity: Some(1.2),
                ..TouchConfigOverrides::default()
            },
            // Safari mishandles preventDefault from passive touch listeners.
            // Pinned here even though it matches the current default.
            Self::SafariDesktop => TouchConfigOverrides {
                passive_listeners: Some(false),
                ..TouchConfigOverrides::default()
            },
            Self::Unknown => TouchConfigOverrides::default(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::SafariDesktop => "safari_desktop",
            Self::Unknown => "unknown",
        }
    }
}

/// Platform overrides for a user-agent string.
#[must_use]
pub fn optimal_touch_config(user_agent: &str) -> TouchConfigOverrides {
    Platform::detect(user_agent).overrides()
}
