#![forbid(unsafe_code)]

//! Performance and error utilities shared by the tracker and gesture manager.

pub mod debounce;
pub mod frame_monitor;
pub mod retry;

pub use debounce::{DebounceCall, DebounceOptions, Debouncer};
pub use frame_monitor::{FrameMonitorConfig, FrameRateMonitor, MonitorPhase, PerformanceReport};
pub use retry::{RetryExhausted, RetryPolicy, retry, retry_with_fallback};
