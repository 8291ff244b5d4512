//! Bundled asset access.
//!
//! A bundle exposes named byte streams; callers identify the format.
//! Reads are total: [`read_asset`] returns the complete asset or an error,
//! never a truncated buffer.

mod bundle;

pub use bundle::{AssetBundle, DirBundle, MemoryBundle, read_asset};
