#![forbid(unsafe_code)]

//! Browser binding for `menuscroll-core`.
//!
//! The JS-facing surface is the [`MobileMenuScroll`] class. Native DOM
//! `scroll`/`touch*` events, `setTimeout` callbacks, and animation frames are
//! all funnelled into one `MenuScrollController` as host events; JS
//! callbacks run only after the controller has finished handling the event,
//! so they may call back into the class freely.
//!
//! Everything that touches the DOM is compiled for `wasm32` only. The
//! payload helpers in [`payload`] and the announcement queue in [`announce`]
//! are plain Rust and tested natively.

pub mod announce;
pub mod payload;

#[cfg(target_arch = "wasm32")]
mod a11y;
#[cfg(target_arch = "wasm32")]
mod bridge;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod scheduler;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::MobileMenuScroll;
