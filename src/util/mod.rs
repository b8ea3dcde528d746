//! Filesystem helpers for the CLI.
//!
//! - [`file_list`]: operand expansion with optional directory recursion

pub mod file_list;

pub use file_list::expand_inputs;
