//! Utility functions for display formatting.

pub mod format;

pub use format::{format_elapsed, format_hours, truncate_string};
