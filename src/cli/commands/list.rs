//! List command implementation.
//!
//! Facet filters, optional text search, sort, and `IssueRow` JSON output.

use anyhow::Result;
use deck_core::view;

use crate::cli::commands::build_filters;
use crate::cli::{CommandContext, ListArgs};
use crate::format::{IssueRow, format_issue_line, print_json};

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: &ListArgs, ctx: &CommandContext) -> Result<()> {
    let snapshot = ctx.store.snapshot();
    let filters = build_filters(&args.filters, &snapshot);

    let mut matched = view::filter_issues(&snapshot.issues, &filters);
    if let Some(query) = args.filters.search.as_deref() {
        let hits = view::search_issues(&snapshot.issues, query);
        matched.retain(|issue| hits.iter().any(|hit| std::ptr::eq(*hit, *issue)));
    }

    let mut sorted = view::sort_issues(matched, args.sort, args.reverse);
    if let Some(limit) = args.limit {
        sorted.truncate(limit);
    }
    tracing::debug!(
        facets = filters.active_facets(),
        matched = sorted.len(),
        "Listed issues"
    );

    if ctx.json {
        let rows: Vec<IssueRow> = sorted
            .iter()
            .map(|issue| IssueRow::resolve(issue, &snapshot))
            .collect();
        return print_json(&rows);
    }

    if sorted.is_empty() {
        println!("No issues found.");
        return Ok(());
    }
    for issue in &sorted {
        let assignee = issue
            .assignee_id
            .as_deref()
            .map(|id| snapshot.user_name_or_unknown(Some(id)));
        println!("{}", format_issue_line(issue, assignee));
    }
    println!("\n{} issue(s)", sorted.len());
    Ok(())
}
