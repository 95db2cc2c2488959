//! Stats command implementation.

use anyhow::Result;
use deck_core::Snapshot;
use deck_core::view::{self, AggregateTarget};

use crate::cli::CommandContext;
use crate::format::{
    PriorityCount, ProjectProgress, Statistics, StatusCount, format_progress_bar, pad_display,
    print_json,
};

/// Compute the statistics document for a snapshot.
#[must_use]
pub fn collect(snapshot: &Snapshot) -> Statistics {
    let issues = &snapshot.issues;
    Statistics {
        overall: view::aggregate(issues, AggregateTarget::All),
        by_status: view::group_by_status(issues)
            .into_iter()
            .map(|g| StatusCount {
                status: g.status,
                count: g.issues.len(),
            })
            .collect(),
        by_priority: view::count_by_priority(issues)
            .into_iter()
            .map(|(priority, count)| PriorityCount { priority, count })
            .collect(),
        by_assignee: view::per_assignee(issues, &snapshot.users),
        projects: snapshot
            .projects
            .iter()
            .map(|p| ProjectProgress {
                id: p.id.clone(),
                name: p.name.clone(),
                progress: p.progress,
                issues: view::project_issue_progress(issues, &p.id),
            })
            .collect(),
    }
}

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let snapshot = ctx.store.snapshot();
    let stats = collect(&snapshot);

    if ctx.json {
        return print_json(&stats);
    }

    println!(
        "Issues: {} total, {} done, {} in progress ({}%)",
        stats.overall.total, stats.overall.completed, stats.overall.in_progress, stats.overall.percent
    );

    println!("\nBy status:");
    for row in &stats.by_status {
        println!("  {} {}", pad_display(row.status.title(), 12), row.count);
    }

    println!("\nBy priority:");
    for row in &stats.by_priority {
        println!("  {} {}", pad_display(row.priority.as_str(), 12), row.count);
    }

    println!("\nBy assignee:");
    for row in &stats.by_assignee {
        println!(
            "  {} {} {}/{}",
            pad_display(&row.name, 16),
            format_progress_bar(row.stats.percent, 10),
            row.stats.completed,
            row.stats.total
        );
    }

    println!("\nProjects:");
    for row in &stats.projects {
        println!(
            "  {} {} (set {}%)",
            pad_display(&row.name, 16),
            format_progress_bar(row.issues.percent, 10),
            row.progress
        );
    }
    Ok(())
}
