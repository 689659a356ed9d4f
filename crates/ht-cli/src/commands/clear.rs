//! Clear command for deleting every entry after confirmation.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::Args;

use ht_core::EntryStore;

use super::util::confirm;

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    args: &ClearArgs,
    store: &mut EntryStore,
) -> Result<()> {
    let Some(action) = store.request_clear() else {
        writeln!(writer, "Nothing to clear.")?;
        return Ok(());
    };

    if !args.yes && !confirm(reader, writer, &action.prompt())? {
        writeln!(writer, "Aborted.")?;
        return Ok(());
    }

    store.confirm(action);
    writeln!(writer, "All entries deleted.")?;
    Ok(())
}
