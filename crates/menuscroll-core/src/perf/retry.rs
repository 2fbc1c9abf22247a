#![forbid(unsafe_code)]

//! Bounded-retry error boundary for fallible container access.
//!
//! Container reads can fail transiently (an element mid-detach, a layout
//! read racing a DOM mutation). [`retry_with_fallback`] retries a closure up
//! to [`RetryPolicy::max_retries`] extra times and then substitutes a
//! fallback value, so callers never see the error. Retries are synchronous
//! and immediate: there is no backoff on a UI event path.
//!
//! # Example
//!
//! ```
//! use menuscroll_core::perf::retry::{RetryPolicy, retry_with_fallback};
//!
//! let mut calls = 0;
//! let value = retry_with_fallback(&RetryPolicy::new(2), "demo", |_| {
//!     calls += 1;
//!     if calls < 3 { Err("flaky") } else { Ok(7) }
//! }, || 0);
//! assert_eq!(value, 7);
//! ```

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How many times a failing operation is re-attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Extra attempts after the first (0 = try once).
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Try once, never retry.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self { max_retries: 0 }
    }

    /// Total attempts including the first.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Error returned by [`retry`] once every attempt failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{operation} failed after {attempts} attempt(s): {last}")]
pub struct RetryExhausted<E: std::fmt::Debug + Display> {
    pub operation: &'static str,
    pub attempts: u32,
    pub last: E,
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// `op` receives the 0-based attempt number.
pub fn retry<T, E, F>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    E: std::fmt::Debug + Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let attempts = policy.attempts();
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) => {
                debug!(operation, attempt, error = %err, "attempt failed");
                attempt += 1;
                if attempt >= attempts {
                    return Err(RetryExhausted {
                        operation,
                        attempts,
                        last: err,
                    });
                }
            }
        }
    }
}

/// Run `op` under `policy`, substituting `fallback()` when every attempt fails.
pub fn retry_with_fallback<T, E, F, D>(
    policy: &RetryPolicy,
    operation: &'static str,
    op: F,
    fallback: D,
) -> T
where
    E: std::fmt::Debug + Display,
    F: FnMut(u32) -> Result<T, E>,
    D: FnOnce() -> T,
{
    match retry(policy, operation, op) {
        Ok(value) => value,
        Err(exhausted) => {
            warn!(error = %exhausted, "using fallback");
            fallback()
        }
    }
}
