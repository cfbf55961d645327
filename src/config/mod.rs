//! Settings loading and merging
//!
//! Handles loading from settings files, environment variables, and CLI arguments
//! with proper precedence (CLI > Env > File > Defaults).

pub mod loader;
pub mod merge;

pub use loader::{discover_settings, load_settings};
pub use merge::{merge_cli_with_settings, CliOverrides};
