//! Vitrine engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the viewer
//! application: window/event-loop runtime, surface layer, frame driver,
//! pointer input, asset bundle access, and the model viewer itself.

pub mod assets;
pub mod core;
pub mod device;
pub mod frame;
pub mod input;
pub mod logging;
pub mod viewer;
pub mod window;
