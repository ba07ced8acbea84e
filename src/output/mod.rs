//! Output module for run reports and the project list export
//!
//! This module handles:
//! - Counting what a harvest run fetched, skipped and failed
//! - Printing the end-of-run summary
//! - Writing and reading the project list CSV

mod project_list;
pub mod stats;

pub use project_list::{read_project_list, select_included, write_project_list, PROJECT_LIST_HEADER};
pub use stats::{print_statistics, HarvestStats};

use thiserror::Error;

/// Errors raised while writing or reading output files
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;
