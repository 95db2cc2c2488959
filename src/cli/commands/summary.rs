//! Summary command implementation.

use anyhow::Result;
use deck_core::HydrationOutcome;
use deck_core::view::{self, AggregateTarget};

use crate::cli::CommandContext;
use crate::format::{CollectionCounts, Summary, format_progress_bar, print_json};

/// Execute the summary command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let snapshot = ctx.store.snapshot();
    let summary = Summary {
        workspace: snapshot.workspace.clone(),
        counts: CollectionCounts::from(snapshot.as_ref()),
        completion: view::aggregate(&snapshot.issues, AggregateTarget::All),
        source: match ctx.hydration {
            HydrationOutcome::Restored { .. } => "restored",
            HydrationOutcome::NoSnapshot { .. } | HydrationOutcome::AlreadyHydrated => "seed",
        },
        data_dir: ctx.config.data_dir.display().to_string(),
        integrity: ctx.config.integrity.to_string(),
        numbering: ctx.config.numbering.to_string(),
    };

    if ctx.json {
        return print_json(&summary);
    }

    println!("{} ({})", summary.workspace.name, summary.workspace.url);
    println!(
        "  {} issues, {} projects, {} users, {} teams, {} labels",
        summary.counts.issues,
        summary.counts.projects,
        summary.counts.users,
        summary.counts.teams,
        summary.counts.labels
    );
    println!(
        "  Completion: {} ({}/{} done)",
        format_progress_bar(summary.completion.percent, 20),
        summary.completion.completed,
        summary.completion.total
    );
    println!(
        "  Source: {} | integrity: {} | numbering: {}",
        summary.source, summary.integrity, summary.numbering
    );
    Ok(())
}
