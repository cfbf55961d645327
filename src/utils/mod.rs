//! Utility helpers

pub mod format;

pub use format::{format_value, repr, significant};
