//! Logging setup and plain-text result summaries

mod output;

pub use output::{setup_output, write_summary};
