//! Workspace command implementation.

use anyhow::{Result, bail};
use deck_core::WorkspaceUpdate;

use crate::cli::{CommandContext, WorkspaceSubcommand};
use crate::format::print_json;

/// Execute a workspace subcommand.
///
/// # Errors
///
/// Returns an error if `set` is given no fields, or JSON serialization fails.
pub fn execute(command: WorkspaceSubcommand, ctx: &mut CommandContext) -> Result<()> {
    if let WorkspaceSubcommand::Set {
        name,
        url,
        notifications,
    } = command
    {
        let update = WorkspaceUpdate {
            name,
            url,
            notifications,
        };
        if update.is_empty() {
            bail!("nothing to set; pass --name, --url or --notifications");
        }
        ctx.store.update_workspace(update);
    }

    let workspace = &ctx.store.state().workspace;
    if ctx.json {
        return print_json(workspace);
    }
    println!("Name:          {}", workspace.name);
    println!("URL:           {}", workspace.url);
    println!("Notifications: {}", workspace.notifications);
    Ok(())
}
