#![forbid(unsafe_code)]

//! Structured JSON log output for hosts that collect diagnostics.
//!
//! Only compiled with the `tracing-json` feature. Components log through
//! `tracing` regardless; this just installs a subscriber.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Default directive when neither `filter` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "menuscroll_core=info";

/// Install a global JSON subscriber.
///
/// `filter` uses `EnvFilter` syntax (`"menuscroll_core=debug"`); `None` reads
/// `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. Returns `false` when a
/// global subscriber was already installed.
pub fn init_json_subscriber(filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(false)
        .try_init()
        .is_ok()
}
