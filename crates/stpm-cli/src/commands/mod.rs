//! Command implementations for stpm-cli

pub mod list;
pub mod maintenance;
pub mod package;

pub use list::run_list;
pub use maintenance::{run_build, run_clean, run_prune};
pub use package::{run_add, run_remove, run_update};

use colored::Colorize;
use stpm_core::BatchReport;

use crate::error::{CliError, Result};

/// Print every failure of a batch and turn them into a single error.
pub(crate) fn finish_batch<T>(report: &BatchReport<T>) -> Result<()> {
    for (id, error) in &report.failed {
        eprintln!("{} {}: {}", "FAILED".red().bold(), id.cyan(), error);
    }
    if report.is_success() {
        return Ok(());
    }
    let total = report.failed.len() + report.succeeded.len();
    Err(CliError::user(format!(
        "{} of {} package(s) failed",
        report.failed.len(),
        total
    )))
}
