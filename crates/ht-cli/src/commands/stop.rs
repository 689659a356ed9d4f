//! Stop command for finishing a running timer.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use ht_core::{EntryId, EntryStore, format_duration};

use super::util::resolve_time;

#[derive(Debug, Args)]
pub struct StopArgs {
    /// Entry to stop.
    pub id: EntryId,

    /// When the work ended (ISO 8601 or e.g. "5 minutes ago"). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &StopArgs,
    store: &mut EntryStore,
    now: DateTime<Utc>,
) -> Result<()> {
    let stopped_at = resolve_time(args.at.as_deref(), now)?;
    let entry = store.stop(args.id, stopped_at)?;
    writeln!(
        writer,
        "Stopped #{} {} after {}",
        entry.id,
        entry.title,
        format_duration(entry.duration_ms)
    )?;
    Ok(())
}
