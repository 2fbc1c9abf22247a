#![forbid(unsafe_code)]

//! Bounded queue of live-region announcements.
//!
//! The browser announcer writes each message to its `aria-live` element and
//! also keeps it here so the host can drain and forward announcements to its
//! own screen-reader wiring.

use std::collections::VecDeque;

use menuscroll_core::Politeness;

/// Oldest entries are dropped past this many undrained announcements.
pub const MAX_ANNOUNCEMENTS: usize = 64;

/// Visually hidden but still exposed to assistive technology.
pub const VISUALLY_HIDDEN_STYLE: &str = "position:absolute;width:1px;height:1px;padding:0;margin:-1px;overflow:hidden;clip:rect(0,0,0,0);white-space:nowrap;border:0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub politeness: Politeness,
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementQueue {
    entries: VecDeque<Announcement>,
}

impl AnnouncementQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: &str, politeness: Politeness) {
        if self.entries.len() >= MAX_ANNOUNCEMENTS {
            self.entries.pop_front();
        }
        self.entries.push_back(Announcement {
            message: message.to_owned(),
            politeness,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take every queued announcement, oldest first.
    pub fn drain(&mut self) -> Vec<Announcement> {
        self.entries.drain(..).collect()
    }
}
