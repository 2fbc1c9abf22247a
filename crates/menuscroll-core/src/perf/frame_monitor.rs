#![forbid(unsafe_code)]

//! Frame-rate monitor for scroll bursts.
//!
//! The monitor is an explicit two-state machine:
//!
//! ```text
//!   Idle --start()--> Monitoring --stop()--> Idle
//! ```
//!
//! While monitoring, the owner records one timestamp per animation frame. Once
//! the sliding window is full, the average frame rate over the window is
//! compared against [`FrameMonitorConfig::min_fps`]. A [`PerformanceReport`]
//! is returned once per degradation episode: the rate has to recover above the
//! floor before another report can be produced.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use web_time::{Duration, Instant};

/// Frame-rate monitor tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameMonitorConfig {
    /// Frames in the sliding window (minimum 2).
    pub sample_window: usize,
    /// Frame rate below which performance counts as degraded.
    pub min_fps: f64,
}

impl Default for FrameMonitorConfig {
    fn default() -> Self {
        Self {
            sample_window: 30,
            min_fps: 30.0,
        }
    }
}

/// Monitor lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorPhase {
    #[default]
    Idle,
    Monitoring,
}

/// Emitted when the measured frame rate drops below the floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub fps: f64,
    pub frame_count: usize,
    #[serde(skip)]
    pub window: Duration,
}

/// Sliding-window frame-rate monitor.
#[derive(Debug, Clone)]
pub struct FrameRateMonitor {
    config: FrameMonitorConfig,
    phase: MonitorPhase,
    frames: VecDeque<Instant>,
    degraded: bool,
}

impl FrameRateMonitor {
    #[must_use]
    pub fn new(config: FrameMonitorConfig) -> Self {
        let window = config.sample_window.max(2);
        Self {
            config: FrameMonitorConfig {
                sample_window: window,
                ..config
            },
            phase: MonitorPhase::Idle,
            frames: VecDeque::with_capacity(window),
            degraded: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.phase == MonitorPhase::Monitoring
    }

    /// Enter `Monitoring`. Returns `true` on an actual `Idle → Monitoring`
    /// transition.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_monitoring() {
            return false;
        }
        self.phase = MonitorPhase::Monitoring;
        self.frames.clear();
        self.frames.push_back(now);
        self.degraded = false;
        debug!("frame monitor started");
        true
    }

    /// Return to `Idle` and discard samples.
    pub fn stop(&mut self) {
        if self.is_monitoring() {
            debug!(frames = self.frames.len(), "frame monitor stopped");
        }
        self.phase = MonitorPhase::Idle;
        self.frames.clear();
        self.degraded = false;
    }

    /// Average frame rate over the current window, once it is full.
    #[must_use]
    pub fn fps(&self) -> Option<f64> {
        if self.frames.len() < self.config.sample_window {
            return None;
        }
        let first = *self.frames.front()?;
        let last = *self.frames.back()?;
        let span = last.saturating_duration_since(first).as_secs_f64();
        if span <= 0.0 {
            return None;
        }
        Some((self.frames.len() - 1) as f64 / span)
    }

    /// Record a frame. Ignored while idle.
    pub fn record_frame(&mut self, now: Instant) -> Option<PerformanceReport> {
        if !self.is_monitoring() {
            return None;
        }
        if self.frames.len() >= self.config.sample_window {
            self.frames.pop_front();
        }
        self.frames.push_back(now);

        let fps = self.fps()?;
        if fps >= self.config.min_fps {
            self.degraded = false;
            return None;
        }
        if self.degraded {
            return None;
        }
        self.degraded = true;
        let window = match (self.frames.front(), self.frames.back()) {
            (Some(first), Some(last)) => last.saturating_duration_since(*first),
            _ => Duration::ZERO,
        };
        warn!(fps, min_fps = self.config.min_fps, "scroll frame rate degraded");
        Some(PerformanceReport {
            fps,
            frame_count: self.frames.len(),
            window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(window: usize, min_fps: f64) -> FrameMonitorConfig {
        FrameMonitorConfig {
            sample_window: window,
            min_fps,
        }
    }

    #[test]
    fn idle_monitor_ignores_frames() {
        let mut m = FrameRateMonitor::new(FrameMonitorConfig::default());
        assert_eq!(m.record_frame(Instant::now()), None);
        assert_eq!(m.phase(), MonitorPhase::Idle);
    }

    #[test]
    fn start_is_a_single_transition() {
        let t0 = Instant::now();
        let mut m = FrameRateMonitor::new(FrameMonitorConfig::default());
        assert!(m.start(t0));
        assert!(!m.start(t0));
        m.stop();
        assert!(m.start(t0));
    }

    #[test]
    fn healthy_frame_rate_reports_nothing() {
        let t0 = Instant::now();
        let mut m = FrameRateMonitor::new(config(5, 30.0));
        m.start(t0);
        for i in 1..20u64 {
            assert_eq!(m.record_frame(t0 + Duration::from_millis(i * 16)), None);
        }
        let fps = m.fps().unwrap();
        assert!(fps > 60.0 && fps < 64.0, "fps = {fps}");
    }

    #[test]
    fn degraded_rate_reports_once_per_episode() {
        let t0 = Instant::now();
        let mut m = FrameRateMonitor::new(config(3, 30.0));
        m.start(t0);
        let mut t = t0;
        let mut reports = 0;
        for _ in 0..6 {
            t += Duration::from_millis(100);
            if m.record_frame(t).is_some() {
                reports += 1;
            }
        }
        assert_eq!(reports, 1);

        // Recover, then degrade again.
        for _ in 0..4 {
            t += Duration::from_millis(10);
            assert!(m.record_frame(t).is_none());
        }
        let mut again = 0;
        for _ in 0..4 {
            t += Duration::from_millis(100);
            if m.record_frame(t).is_some() {
                again += 1;
            }
        }
        assert_eq!(again, 1);
    }

    #[test]
    fn report_carries_measured_rate() {
        let t0 = Instant::now();
        let mut m = FrameRateMonitor::new(config(2, 30.0));
        m.start(t0);
        let report = m.record_frame(t0 + Duration::from_millis(50)).unwrap();
        assert!((report.fps - 20.0).abs() < 1e-9);
        assert_eq!(report.frame_count, 2);
        assert_eq!(report.window, Duration::from_millis(50));
    }
}
