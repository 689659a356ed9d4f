//! Delete command for removing an entry and its sub-entries.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use ht_core::{EntryId, EntryStore};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Entry to delete, together with everything nested under it.
    pub id: EntryId,
}

pub fn run<W: Write>(writer: &mut W, args: &DeleteArgs, store: &mut EntryStore) -> Result<()> {
    let removed = store.delete(args.id)?;
    match removed.saturating_sub(1) {
        0 => writeln!(writer, "Deleted #{}", args.id)?,
        1 => writeln!(writer, "Deleted #{} and 1 sub-entry", args.id)?,
        nested => writeln!(writer, "Deleted #{} and {nested} sub-entries", args.id)?,
    }
    Ok(())
}
