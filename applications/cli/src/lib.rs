//! Shelf command line
//!
//! Terminal host for the folder import: configuration loading, interactive
//! prompts and the progress bar.

pub mod config;
pub mod progress;
pub mod terminal;

pub use config::{ConfigError, ShelfConfig};
pub use progress::TerminalMeter;
