//! Utility functions for formatting and identifier parsing.

pub mod format;
pub mod id;

// Re-export commonly used functions at module level
pub use format::{events_found, format_file_size, format_optional, truncate_string};
