//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single viewer window, and wires
//! visibility transitions to the frame driver.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
