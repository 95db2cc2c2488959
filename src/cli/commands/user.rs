//! User command implementation.

use anyhow::{Result, bail};
use deck_core::view;
use deck_core::{EntityKind, User};

use crate::cli::commands::{resolve_team, resolve_user};
use crate::cli::{CommandContext, UserSubcommand};
use crate::format::{format_progress_bar, pad_display, print_json};

/// Execute a user subcommand.
///
/// # Errors
///
/// Returns an error if a referenced entity does not exist, the email is
/// already taken, or JSON serialization fails.
pub fn execute(command: UserSubcommand, ctx: &mut CommandContext) -> Result<()> {
    match command {
        UserSubcommand::List => list(ctx),
        UserSubcommand::Create {
            name,
            email,
            role,
            teams,
        } => {
            let (user, team_ids) = {
                let snapshot = ctx.store.state();
                if snapshot
                    .users
                    .iter()
                    .any(|u| u.email.eq_ignore_ascii_case(&email))
                {
                    bail!(deck_core::DeckError::validation("email", "already in use"));
                }
                let team_ids = teams
                    .iter()
                    .map(|r| resolve_team(snapshot, r))
                    .collect::<Result<Vec<_>>>()?;
                let user = User {
                    id: ctx.store.next_id(EntityKind::User),
                    name,
                    email,
                    avatar: None,
                    role,
                    team_ids: Vec::new(),
                };
                (user, team_ids)
            };

            let id = user.id.clone();
            if !ctx.store.add_user(user) {
                bail!("user {id} was not added");
            }
            // Joining through the membership operation keeps memberCount in step.
            for team_id in &team_ids {
                ctx.store.add_team_member(team_id, &id);
            }
            if ctx.json {
                return print_json(&ctx.store.user(&id));
            }
            println!("User {id} created");
            Ok(())
        }
        UserSubcommand::Delete { user } => {
            let id = resolve_user(ctx.store.state(), &user)?;
            ctx.store.delete_user(&id);
            if ctx.json {
                return print_json(&serde_json::json!({ "action": "deleted", "id": id }));
            }
            println!("User {id} deleted");
            Ok(())
        }
    }
}

fn list(ctx: &CommandContext) -> Result<()> {
    let snapshot = ctx.store.state();
    let rows = view::per_assignee(&snapshot.issues, &snapshot.users);
    if ctx.json {
        return print_json(&snapshot.users);
    }
    for user in &snapshot.users {
        let load = rows
            .iter()
            .find(|r| r.user_id.as_deref() == Some(user.id.as_str()))
            .map(|r| r.stats)
            .unwrap_or_default();
        println!(
            "{} {} {} {} {}/{}",
            pad_display(&user.id, 4),
            pad_display(&user.name, 16),
            pad_display(user.role.as_str(), 8),
            format_progress_bar(load.percent, 10),
            load.completed,
            load.total
        );
    }
    Ok(())
}
