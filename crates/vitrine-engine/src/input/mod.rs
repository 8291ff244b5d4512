//! Pointer input.
//!
//! Public API is platform-agnostic and does not expose winit types. The
//! runtime translates window-system events into `PointerEvent`s and
//! forwards them to the viewer, which consumes every event.

mod tracker;
mod types;

pub use tracker::PointerTracker;
pub use types::PointerEvent;
