//! Label command implementation.

use anyhow::{Result, bail};
use deck_core::view::{self, AggregateTarget};
use deck_core::{EntityKind, Label};
use serde::Serialize;

use crate::cli::commands::resolve_label;
use crate::cli::{CommandContext, LabelSubcommand};
use crate::format::{pad_display, print_json};

#[derive(Serialize)]
struct LabelRow<'a> {
    #[serde(flatten)]
    label: &'a Label,
    issues: usize,
}

/// Execute a label subcommand.
///
/// # Errors
///
/// Returns an error if the label does not exist, the name is empty, or JSON
/// serialization fails.
pub fn execute(command: LabelSubcommand, ctx: &mut CommandContext) -> Result<()> {
    match command {
        LabelSubcommand::List => list(ctx),
        LabelSubcommand::Create { name, color } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                bail!(deck_core::DeckError::validation("name", "cannot be empty"));
            }
            let label = Label {
                id: ctx.store.next_id(EntityKind::Label),
                name,
                color,
            };
            let id = label.id.clone();
            if !ctx.store.add_label(label) {
                bail!("label {id} was not added");
            }
            report(ctx, "created", &id)
        }
        LabelSubcommand::Delete { label } => {
            let id = resolve_label(ctx.store.state(), &label)?;
            ctx.store.delete_label(&id);
            report(ctx, "deleted", &id)
        }
    }
}

fn list(ctx: &CommandContext) -> Result<()> {
    let snapshot = ctx.store.state();
    let rows: Vec<LabelRow<'_>> = snapshot
        .labels
        .iter()
        .map(|label| LabelRow {
            label,
            issues: view::aggregate(&snapshot.issues, AggregateTarget::Label(&label.id)).total,
        })
        .collect();

    if ctx.json {
        return print_json(&rows);
    }
    for row in &rows {
        println!(
            "{} {} {} ({} issues)",
            pad_display(&row.label.id, 4),
            pad_display(&row.label.name, 16),
            row.label.color,
            row.issues
        );
    }
    Ok(())
}

fn report(ctx: &CommandContext, action: &str, id: &str) -> Result<()> {
    if ctx.json {
        return print_json(&serde_json::json!({ "action": action, "id": id }));
    }
    println!("Label {id} {action}");
    Ok(())
}
