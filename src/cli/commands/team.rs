//! Team command implementation.

use anyhow::{Result, bail};
use deck_core::{EntityKind, Team};

use crate::cli::commands::{resolve_team, resolve_user};
use crate::cli::{CommandContext, TeamSubcommand};
use crate::format::{pad_display, print_json};

/// Execute a team subcommand.
///
/// # Errors
///
/// Returns an error if a referenced entity does not exist, the identifier is
/// invalid or taken, a cascade-mode delete is refused, or JSON serialization
/// fails.
pub fn execute(command: TeamSubcommand, ctx: &mut CommandContext) -> Result<()> {
    match command {
        TeamSubcommand::List => list(ctx),
        TeamSubcommand::Create {
            name,
            identifier,
            icon,
        } => {
            let identifier = identifier.trim().to_uppercase();
            if identifier.is_empty() || !identifier.chars().all(|c| c.is_ascii_alphanumeric()) {
                bail!(deck_core::DeckError::validation(
                    "identifier",
                    "must be letters and digits"
                ));
            }
            if ctx
                .store
                .state()
                .teams
                .iter()
                .any(|t| t.identifier == identifier)
            {
                bail!(deck_core::DeckError::validation("identifier", "already in use"));
            }
            let team = Team {
                id: ctx.store.next_id(EntityKind::Team),
                name,
                icon,
                identifier,
                member_count: 0,
            };
            let id = team.id.clone();
            if !ctx.store.add_team(team) {
                bail!("team {id} was not added");
            }
            show_team(ctx, &id)
        }
        TeamSubcommand::Delete { team } => {
            let id = resolve_team(ctx.store.state(), &team)?;
            if !ctx.store.delete_team(&id) {
                bail!("team {team} is still referenced by issues or projects");
            }
            if ctx.json {
                return print_json(&serde_json::json!({ "action": "deleted", "id": id }));
            }
            println!("Team {id} deleted");
            Ok(())
        }
        TeamSubcommand::Join { team, user } => {
            let (team_id, user_id) = resolve_pair(ctx, &team, &user)?;
            if !ctx.store.add_team_member(&team_id, &user_id) {
                tracing::info!(team = %team_id, user = %user_id, "Already a member");
            }
            show_team(ctx, &team_id)
        }
        TeamSubcommand::Leave { team, user } => {
            let (team_id, user_id) = resolve_pair(ctx, &team, &user)?;
            if !ctx.store.remove_team_member(&team_id, &user_id) {
                tracing::info!(team = %team_id, user = %user_id, "Not a member");
            }
            show_team(ctx, &team_id)
        }
    }
}

fn resolve_pair(ctx: &CommandContext, team: &str, user: &str) -> Result<(String, String)> {
    let snapshot = ctx.store.state();
    Ok((resolve_team(snapshot, team)?, resolve_user(snapshot, user)?))
}

fn show_team(ctx: &CommandContext, id: &str) -> Result<()> {
    let team = ctx
        .store
        .team(id)
        .ok_or_else(|| deck_core::DeckError::not_found("team", id))?;
    if ctx.json {
        return print_json(team);
    }
    println!(
        "{} {} {} ({} members)",
        team.icon, team.identifier, team.name, team.member_count
    );
    Ok(())
}

fn list(ctx: &CommandContext) -> Result<()> {
    let teams = &ctx.store.state().teams;
    if ctx.json {
        return print_json(teams);
    }
    for team in teams {
        println!(
            "{} {} {} {} members",
            pad_display(&team.id, 4),
            pad_display(&team.identifier, 6),
            pad_display(&team.name, 16),
            team.member_count
        );
    }
    Ok(())
}
