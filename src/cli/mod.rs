//! CLI module for llmsay
//!
//! Handles command-line argument parsing, prompt acquisition and terminal
//! output.

pub mod args;
pub mod display;
pub mod prompt;

pub use args::{resolve_config_path, Args, Commands, Verbosity};
pub use display::SpinnerSink;
