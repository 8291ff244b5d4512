//! Logging utilities.
//!
//! Centralizes logger initialization. Kept small; the crate logs through
//! the standard `log` facade everywhere else.

mod init;

pub use init::{LoggingConfig, init_logging};
