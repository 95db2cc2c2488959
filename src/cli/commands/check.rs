//! Check command implementation.

use anyhow::{Result, bail};
use deck_core::integrity;

use crate::cli::{CheckArgs, CommandContext};
use crate::format::{CheckReport, print_json};

/// Execute the check command.
///
/// # Errors
///
/// Returns an error with `--strict` when any reference dangles, or if JSON
/// serialization fails.
pub fn execute(args: &CheckArgs, ctx: &CommandContext) -> Result<()> {
    let dangling = integrity::dangling_references(ctx.store.state());
    let report = CheckReport {
        ok: dangling.is_empty(),
        dangling,
    };

    if ctx.json {
        print_json(&report)?;
    } else if report.ok {
        println!("No dangling references.");
    } else {
        for entry in &report.dangling {
            println!("{entry}");
        }
        println!("\n{} dangling reference(s)", report.dangling.len());
    }

    if args.strict && !report.ok {
        bail!("{} dangling reference(s)", report.dangling.len());
    }
    Ok(())
}
