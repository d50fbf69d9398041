//! TUI Widgets
//!
//! Custom widgets for the DataChat TUI.

mod dataset;
mod file_prompt;

pub use dataset::{format_size, render_dataset};
pub use file_prompt::render_file_prompt;
