//! Display formatting for terminal output
//!
//! Formats souls, readings and statistics for the CLI.

pub mod reading;
pub mod soul;

pub use reading::{format_reading, format_stats};
pub use soul::{format_soul_details, format_soul_list};
