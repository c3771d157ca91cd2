//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling (`requestAnimationFrame` on web, manual stepping elsewhere)
//! - Held-key input

pub mod frame;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use frame::{FrameHandle, FrameLoop, FrameScheduler, ManualScheduler};
pub use input::{Key, KeyTracker};
#[cfg(target_arch = "wasm32")]
pub use web::{KeyListeners, WebScheduler};
