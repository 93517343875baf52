//! Command-line interface

pub mod output;

pub use output::{format_json, format_result};
