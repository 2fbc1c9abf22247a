#![forbid(unsafe_code)]

//! Ambient host capabilities injected into the components.

use std::fmt;
use std::rc::Rc;

use crate::a11y::{Announcer, MotionPreference, SilentAnnouncer, StaticMotion};
use crate::schedule::Scheduler;

/// Scheduler, live-region announcer, and motion preference supplied by the
/// host page. Cloning shares the same underlying services.
#[derive(Clone)]
pub struct HostServices {
    pub scheduler: Rc<dyn Scheduler>,
    pub announcer: Rc<dyn Announcer>,
    pub motion: Rc<dyn MotionPreference>,
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices")
            .field("reduced_motion", &self.motion.prefers_reduced_motion())
            .finish_non_exhaustive()
    }
}

impl HostServices {
    #[must_use]
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        announcer: Rc<dyn Announcer>,
        motion: Rc<dyn MotionPreference>,
    ) -> Self {
        Self {
            scheduler,
            announcer,
            motion,
        }
    }

    /// Services with no announcements and full motion.
    #[must_use]
    pub fn with_scheduler(scheduler: Rc<dyn Scheduler>) -> Self {
        Self::new(scheduler, Rc::new(SilentAnnouncer), Rc::new(StaticMotion(false)))
    }
}
