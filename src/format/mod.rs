//! Output formatting for `deck`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//! With `--json`, stdout carries only the JSON document; logs go to stderr.
//!
//! # JSON Output Types
//!
//! - [`IssueRow`] - Issue with resolved names (list)
//! - [`BoardColumn`] - Status bucket (board)
//! - [`Statistics`] - Aggregates (stats)
//! - [`Summary`] - Workspace overview (summary)
//! - [`CheckReport`] - Dangling references (check)

mod output;
mod text;

pub use output::{
    BoardColumn, CheckReport, CollectionCounts, IssueRow, PriorityCount, ProjectProgress,
    Statistics, StatusCount, Summary,
};
pub use text::{
    format_issue_line, format_priority, format_progress_bar, format_status_icon, icons,
    pad_display,
};

use anyhow::Result;
use serde::Serialize;

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
