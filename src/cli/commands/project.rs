//! Project command implementation.

use anyhow::{Result, bail};
use deck_core::{EntityKind, Project};

use crate::cli::commands::{resolve_project, resolve_team, resolve_user, stats};
use crate::cli::{CommandContext, ProjectCreateArgs, ProjectSubcommand};
use crate::format::{format_progress_bar, pad_display, print_json};

/// Execute a project subcommand.
///
/// # Errors
///
/// Returns an error if a referenced entity does not exist, the project could
/// not be added, or JSON serialization fails.
pub fn execute(command: ProjectSubcommand, ctx: &mut CommandContext) -> Result<()> {
    match command {
        ProjectSubcommand::List => list(ctx),
        ProjectSubcommand::Create(args) => create(args, ctx),
        ProjectSubcommand::Delete { project } => {
            let id = resolve_project(ctx.store.state(), &project)?;
            ctx.store.delete_project(&id);
            if ctx.json {
                return print_json(&serde_json::json!({ "action": "deleted", "id": id }));
            }
            println!("Project {id} deleted");
            Ok(())
        }
    }
}

fn create(args: ProjectCreateArgs, ctx: &mut CommandContext) -> Result<()> {
    let name = args.name.trim().to_string();
    if name.is_empty() {
        bail!(deck_core::DeckError::validation("name", "cannot be empty"));
    }
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if end < start {
            bail!(deck_core::DeckError::validation("end", "is before start"));
        }
    }

    let project = {
        let snapshot = ctx.store.state();
        Project {
            id: ctx.store.next_id(EntityKind::Project),
            name,
            icon: args.icon,
            color: args.color,
            description: args.description,
            team_id: resolve_team(snapshot, &args.team)?,
            status: args.status,
            progress: args.progress,
            start_date: args.start,
            end_date: args.end,
            lead: args
                .lead
                .as_deref()
                .map(|r| resolve_user(snapshot, r))
                .transpose()?,
        }
    };

    let id = project.id.clone();
    if !ctx.store.add_project(project) {
        bail!("project {id} was not added");
    }
    if ctx.json {
        return print_json(&ctx.store.project(&id));
    }
    println!("Project {id} created");
    Ok(())
}

fn list(ctx: &CommandContext) -> Result<()> {
    let projects = stats::collect(ctx.store.state()).projects;
    if ctx.json {
        return print_json(&projects);
    }
    for row in &projects {
        println!(
            "{} {} set {:>3}% | issues {}",
            pad_display(&row.id, 4),
            pad_display(&row.name, 20),
            row.progress,
            format_progress_bar(row.issues.percent, 10)
        );
    }
    Ok(())
}
