#![forbid(unsafe_code)]

//! Browser implementations of the core accessibility hooks.

use std::cell::RefCell;

use menuscroll_core::{Announcer, MotionPreference, Politeness};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, MediaQueryList, Window};

use crate::announce::{Announcement, AnnouncementQueue, VISUALLY_HIDDEN_STYLE};
use crate::payload::REDUCED_MOTION_QUERY;

/// Writes announcements into a visually hidden `aria-live` region and keeps
/// a bounded copy for the host to drain.
pub(crate) struct LiveRegionAnnouncer {
    region: RefCell<Option<HtmlElement>>,
    queue: RefCell<AnnouncementQueue>,
}

impl LiveRegionAnnouncer {
    /// Create the live region under `document.body`. Without a body the
    /// announcer only queues.
    pub(crate) fn attach(document: Option<&Document>) -> Self {
        let region = document.and_then(create_region);
        if region.is_none() {
            debug!("no live region available, announcements are queued only");
        }
        Self {
            region: RefCell::new(region),
            queue: RefCell::new(AnnouncementQueue::new()),
        }
    }

    pub(crate) fn drain(&self) -> Vec<Announcement> {
        self.queue.borrow_mut().drain()
    }

    /// Remove the live region from the document.
    pub(crate) fn detach(&self) {
        if let Some(region) = self.region.borrow_mut().take() {
            region.remove();
        }
    }
}

fn create_region(document: &Document) -> Option<HtmlElement> {
    let body = document.body()?;
    let region = document
        .create_element("div")
        .ok()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    for (name, value) in [
        ("role", "status"),
        ("aria-live", Politeness::Polite.as_str()),
        ("aria-atomic", "true"),
        ("style", VISUALLY_HIDDEN_STYLE),
    ] {
        if let Err(err) = region.set_attribute(name, value) {
            warn!(attribute = name, error = ?err, "failed to configure live region");
        }
    }
    body.append_child(&region).ok()?;
    Some(region)
}

impl Announcer for LiveRegionAnnouncer {
    fn announce(&self, message: &str, politeness: Politeness) {
        self.queue.borrow_mut().push(message, politeness);
        if let Some(region) = self.region.borrow().as_ref() {
            if let Err(err) = region.set_attribute("aria-live", politeness.as_str()) {
                warn!(error = ?err, "failed to set aria-live");
            }
            // Screen readers skip unchanged text, so a repeated message
            // needs the region emptied first.
            region.set_text_content(None);
            region.set_text_content(Some(message));
        }
    }
}

impl Drop for LiveRegionAnnouncer {
    fn drop(&mut self) {
        self.detach();
    }
}

/// `matchMedia("(prefers-reduced-motion: reduce)")`, read on every query so
/// a preference change applies without re-creating the menu.
pub(crate) struct MediaQueryMotion {
    query: Option<MediaQueryList>,
}

impl MediaQueryMotion {
    pub(crate) fn new(window: &Window) -> Self {
        let query = match window.match_media(REDUCED_MOTION_QUERY) {
            Ok(query) => query,
            Err(err) => {
                warn!(error = ?err, "matchMedia failed, assuming full motion");
                None
            }
        };
        Self { query }
    }
}

impl MotionPreference for MediaQueryMotion {
    fn prefers_reduced_motion(&self) -> bool {
        self.query.as_ref().is_some_and(MediaQueryList::matches)
    }
}
