//! Front-end commands
//!
//! The search page and the upload form, plus the state that wires them to
//! one configuration.

pub mod search;
mod state;
pub mod upload;

pub use state::AppState;
