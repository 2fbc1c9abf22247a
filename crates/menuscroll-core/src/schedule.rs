#![forbid(unsafe_code)]

//! Timer and animation-frame scheduling supplied by the host.
//!
//! Work is never done inside the scheduler: it only hands out ids. When a
//! timer or frame fires, the host delivers [`HostEvent::Timer`] /
//! [`HostEvent::Frame`](crate::controller::HostEvent) with that id, and the
//! owning component picks it up. Components hold at most one pending timer
//! and one pending frame each, and cancel them on teardown.
//!
//! [`HostEvent::Timer`]: crate::controller::HostEvent::Timer

use web_time::Duration;

/// Id of a pending timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Id of a pending animation-frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

/// Host event-loop scheduling (`setTimeout` / `requestAnimationFrame`).
pub trait Scheduler {
    fn set_timeout(&self, delay: Duration) -> TimerId;

    /// Cancel a timeout. Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);

    fn request_frame(&self) -> FrameId;

    /// Cancel a frame request. Unknown or already-fired ids are ignored.
    fn cancel_frame(&self, id: FrameId);
}
