#![forbid(unsafe_code)]

//! Deadline-based debouncer with leading/trailing edges and a max-wait cap.
//!
//! The debouncer does not own a timer. Each [`Debouncer::call`] reports
//! whether the caller should run immediately (leading edge) and when the next
//! deadline is; the host schedules a timeout for [`Debouncer::deadline`] and
//! calls [`Debouncer::poll`] when it fires. `poll` is safe to call early or
//! late: it only fires once the deadline has actually passed.
//!
//! # Semantics
//!
//! - `wait`: quiet period after the last call before the trailing edge fires.
//! - `leading`: fire on the first call of a burst.
//! - `trailing`: fire after the quiet period, but only if at least one call
//!   arrived that was not already consumed by the leading edge.
//! - `max_wait`: upper bound between the first call of a burst and a trailing
//!   fire, even if calls keep arriving.

use serde::{Deserialize, Serialize};
use web_time::{Duration, Instant};

/// Debounce tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebounceOptions {
    pub wait_ms: u64,
    pub leading: bool,
    pub trailing: bool,
    pub max_wait_ms: Option<u64>,
}

impl Default for DebounceOptions {
    fn default() -> Self {
        Self {
            wait_ms: 100,
            leading: false,
            trailing: true,
            max_wait_ms: None,
        }
    }
}

impl DebounceOptions {
    /// Trailing-only debounce of `wait`.
    #[must_use]
    pub fn trailing(wait: Duration) -> Self {
        Self {
            wait_ms: wait.as_millis() as u64,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait_ms = Some(max_wait.as_millis() as u64);
        self
    }

    #[must_use]
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

#[derive(Debug, Clone, Copy)]
struct Burst {
    first_call: Instant,
    last_call: Instant,
    /// A call arrived that the trailing edge still owes a fire for.
    trailing_owed: bool,
}

/// Outcome of a [`Debouncer::call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceCall {
    /// Run the debounced work now (leading edge).
    pub fire_now: bool,
    /// This call started a new burst (first call since the last fire/cancel).
    pub burst_started: bool,
}

/// Host-driven debouncer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    options: DebounceOptions,
    burst: Option<Burst>,
}

impl Debouncer {
    #[must_use]
    pub fn new(options: DebounceOptions) -> Self {
        Self {
            options,
            burst: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> DebounceOptions {
        self.options
    }

    /// Whether a burst is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.burst.is_some()
    }

    /// Record a call at `now`.
    pub fn call(&mut self, now: Instant) -> DebounceCall {
        match self.burst.as_mut() {
            Some(burst) => {
                burst.last_call = now;
                burst.trailing_owed = true;
                DebounceCall {
                    fire_now: false,
                    burst_started: false,
                }
            }
            None => {
                let fire_now = self.options.leading;
                self.burst = Some(Burst {
                    first_call: now,
                    last_call: now,
                    trailing_owed: !fire_now,
                });
                DebounceCall {
                    fire_now,
                    burst_started: true,
                }
            }
        }
    }

    /// When the pending burst is due, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        let burst = self.burst?;
        let quiet = burst.last_call + self.options.wait();
        Some(match self.options.max_wait_ms {
            Some(max) => quiet.min(burst.first_call + Duration::from_millis(max)),
            None => quiet,
        })
    }

    /// Delay from `now` until the deadline (zero when already due).
    #[must_use]
    pub fn delay_from(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Close the burst if its deadline has passed. Returns `true` when the
    /// trailing edge fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline() else {
            return false;
        };
        if now < deadline {
            return false;
        }
        let owed = self.burst.take().is_some_and(|b| b.trailing_owed);
        owed && self.options.trailing
    }

    /// Close the burst immediately, returning `true` if a trailing fire was owed.
    pub fn flush(&mut self) -> bool {
        let owed = self.burst.take().is_some_and(|b| b.trailing_owed);
        owed && self.options.trailing
    }

    /// Drop any pending burst without firing.
    pub fn cancel(&mut self) {
        self.burst = None;
    }
}
