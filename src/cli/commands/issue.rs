//! Issue command implementation.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use deck_core::{EntityKind, Issue, IssueUpdate};

use crate::cli::commands::{
    resolve_issue, resolve_label, resolve_project, resolve_team, resolve_user,
};
use crate::cli::{CommandContext, IssueCreateArgs, IssueSubcommand, IssueUpdateArgs};
use crate::format::{IssueRow, format_issue_line, print_json};

/// Execute an issue subcommand.
///
/// # Errors
///
/// Returns an error if a referenced entity does not exist, validation fails,
/// or JSON serialization fails.
pub fn execute(command: IssueSubcommand, ctx: &mut CommandContext) -> Result<()> {
    match command {
        IssueSubcommand::Create(args) => create(args, ctx),
        IssueSubcommand::Show { issue } => show(&issue, ctx),
        IssueSubcommand::Update(args) => update(&args, ctx),
        IssueSubcommand::Delete { issues } => delete(&issues, ctx),
    }
}

fn create(args: IssueCreateArgs, ctx: &mut CommandContext) -> Result<()> {
    let title = args.title.trim().to_string();
    if title.is_empty() {
        bail!(deck_core::DeckError::validation("title", "cannot be empty"));
    }

    let issue = {
        let snapshot = ctx.store.state();
        let team_id = resolve_team(snapshot, &args.team)?;
        let assignee_id = args
            .assignee
            .as_deref()
            .map(|r| resolve_user(snapshot, r))
            .transpose()?;
        let project_id = args
            .project
            .as_deref()
            .map(|r| resolve_project(snapshot, r))
            .transpose()?;
        let labels = args
            .labels
            .iter()
            .map(|r| resolve_label(snapshot, r))
            .collect::<Result<Vec<_>>>()?;
        let created_by = match args.created_by.as_deref() {
            Some(r) => resolve_user(snapshot, r)?,
            None => snapshot
                .users
                .first()
                .map(|u| u.id.clone())
                .context("no users exist to author the issue")?,
        };
        let identifier = ctx
            .store
            .next_issue_identifier(&team_id)
            .context("team disappeared while creating issue")?;

        let now = Utc::now();
        Issue {
            id: ctx.store.next_id(EntityKind::Issue),
            identifier,
            title,
            description: args.description,
            status: args.status,
            priority: args.priority,
            assignee_id,
            project_id,
            team_id,
            labels,
            due_date: args.due,
            estimate: args.estimate,
            created_at: now,
            updated_at: now,
            created_by,
        }
    };

    let id = issue.id.clone();
    if !ctx.store.add_issue(issue) {
        bail!("issue {id} was not added");
    }
    tracing::info!(id = %id, "Created issue");
    print_issue(&id, ctx)
}

fn show(reference: &str, ctx: &CommandContext) -> Result<()> {
    let id = resolve_issue(ctx.store.state(), reference)?;
    print_issue(&id, ctx)
}

fn update(args: &IssueUpdateArgs, ctx: &mut CommandContext) -> Result<()> {
    let snapshot = ctx.store.snapshot();
    let id = resolve_issue(&snapshot, &args.issue)?;

    let assignee_id = if args.unassign {
        Some(None)
    } else {
        args.assignee
            .as_deref()
            .map(|r| resolve_user(&snapshot, r).map(Some))
            .transpose()?
    };
    let project_id = if args.no_project {
        Some(None)
    } else {
        args.project
            .as_deref()
            .map(|r| resolve_project(&snapshot, r).map(Some))
            .transpose()?
    };
    let team_id = args
        .team
        .as_deref()
        .map(|r| resolve_team(&snapshot, r))
        .transpose()?;
    let add_labels = args
        .add_label
        .iter()
        .map(|r| resolve_label(&snapshot, r))
        .collect::<Result<Vec<_>>>()?;
    let remove_labels = args
        .remove_label
        .iter()
        .map(|r| resolve_label(&snapshot, r).unwrap_or_else(|_| r.clone()))
        .collect::<Vec<_>>();

    let patch = IssueUpdate {
        title: args.title.clone(),
        description: args.description.clone(),
        status: args.status,
        priority: args.priority,
        assignee_id,
        project_id,
        team_id,
        due_date: if args.clear_due { Some(None) } else { args.due.map(Some) },
        estimate: if args.clear_estimate {
            Some(None)
        } else {
            args.estimate.map(Some)
        },
        ..Default::default()
    };

    if !patch.is_empty() || (add_labels.is_empty() && remove_labels.is_empty()) {
        ctx.store.update_issue(&id, patch);
    }
    for label in &add_labels {
        ctx.store.add_issue_label(&id, label);
    }
    for label in &remove_labels {
        ctx.store.remove_issue_label(&id, label);
    }
    tracing::info!(id = %id, "Updated issue");
    print_issue(&id, ctx)
}

fn delete(references: &[String], ctx: &mut CommandContext) -> Result<()> {
    let ids = {
        let snapshot = ctx.store.state();
        references
            .iter()
            .map(|r| resolve_issue(snapshot, r))
            .collect::<Result<Vec<_>>>()?
    };
    ctx.store.delete_issues(&ids);

    if ctx.json {
        return print_json(&serde_json::json!({ "deleted": ids }));
    }
    println!("Deleted {} issue(s)", ids.len());
    Ok(())
}

fn print_issue(id: &str, ctx: &CommandContext) -> Result<()> {
    let snapshot = ctx.store.state();
    let issue = snapshot
        .issue(id)
        .ok_or_else(|| deck_core::DeckError::not_found("issue", id))?;
    let row = IssueRow::resolve(issue, snapshot);

    if ctx.json {
        return print_json(&row);
    }

    println!("{}", format_issue_line(issue, row.assignee_name.as_deref()));
    let team = snapshot
        .team(&issue.team_id)
        .map_or("Unknown team", |t| t.name.as_str());
    println!("  Team:     {team}");
    if let Some(project) = &row.project_name {
        println!("  Project:  {project}");
    }
    if !row.label_names.is_empty() {
        println!("  Labels:   {}", row.label_names.join(", "));
    }
    if let Some(due) = issue.due_date {
        println!("  Due:      {due}");
    }
    if let Some(points) = issue.estimate {
        println!("  Estimate: {points}");
    }
    println!("  Updated:  {}", issue.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if !issue.description.is_empty() {
        println!("\n{}", issue.description);
    }
    Ok(())
}
