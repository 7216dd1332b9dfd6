//! Utility functions shared across the application
//!
//! Common helpers for formatting, file names and URLs, and system info.

mod format;
mod path;
mod system;

pub use format::*;
pub use path::*;
pub use system::*;
