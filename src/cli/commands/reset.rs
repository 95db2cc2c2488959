//! Reset command implementation.

use anyhow::{Result, bail};

use crate::cli::{CommandContext, ResetArgs};

/// Execute the reset command.
///
/// By default the seed dataset is written over the snapshot. With `--purge`
/// the snapshot file is removed so the next run starts from the seed.
///
/// # Errors
///
/// Returns an error if `--purge` cannot remove the snapshot.
pub fn execute(args: &ResetArgs, ctx: &mut CommandContext) -> Result<()> {
    if args.purge {
        match ctx.store.persistence() {
            Some(adapter) if !adapter.clear() => {
                bail!("failed to remove snapshot {}", adapter.key());
            }
            Some(_) => println!("Snapshot removed"),
            None => println!("Persistence disabled; nothing to remove"),
        }
        return Ok(());
    }

    ctx.store.reset_to_seed();
    println!("Reset to seed data");
    Ok(())
}
