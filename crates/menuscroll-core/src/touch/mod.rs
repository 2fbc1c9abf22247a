#![forbid(unsafe_code)]

//! Touch gestures: configuration layering, platform tuning, and the gesture
//! manager itself.

pub mod config;
pub mod gesture;
pub mod platform;

pub use config::{TouchConfigOverrides, TouchGestureConfig};
pub use gesture::{
    MomentumState, TouchDirection, TouchGestureManager, TouchInput, TouchPhase, TouchResponse,
    TouchState,
};
pub use platform::{Platform, optimal_touch_config};
