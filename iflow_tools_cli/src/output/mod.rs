//! Console rendering of plans, run results and package listings

mod listing;
mod report;

pub use listing::{format_packages, print_packages};
pub use report::{format_job_header, format_summary, print_job_outcome, print_plan, print_summary};

use anyhow::Result;
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
