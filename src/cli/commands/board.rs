//! Board command implementation.

use anyhow::Result;
use deck_core::view;

use crate::cli::commands::build_filters;
use crate::cli::{CommandContext, FilterArgs};
use crate::format::{BoardColumn, format_issue_line, format_status_icon, print_json};

/// Execute the board command.
///
/// Every status column is printed, empty ones included.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: &FilterArgs, ctx: &CommandContext) -> Result<()> {
    let snapshot = ctx.store.snapshot();
    let filters = build_filters(args, &snapshot);
    let mut matched = view::filter_issues(&snapshot.issues, &filters);
    if let Some(query) = args.search.as_deref() {
        let hits = view::search_issues(&snapshot.issues, query);
        matched.retain(|issue| hits.iter().any(|hit| std::ptr::eq(*hit, *issue)));
    }

    let groups = view::group_by_status(matched);

    if ctx.json {
        let columns: Vec<BoardColumn> = groups
            .iter()
            .map(|group| BoardColumn::from_group(group, &snapshot))
            .collect();
        return print_json(&columns);
    }

    for group in &groups {
        println!(
            "{} {} ({})",
            format_status_icon(group.status),
            group.status.title(),
            group.issues.len()
        );
        for issue in &group.issues {
            let assignee = issue
                .assignee_id
                .as_deref()
                .map(|id| snapshot.user_name_or_unknown(Some(id)));
            println!("    {}", format_issue_line(issue, assignee));
        }
    }
    Ok(())
}
