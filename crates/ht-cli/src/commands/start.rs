//! Start command for beginning a new timer.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use ht_core::{EntryId, EntryStore};

use super::util::resolve_time;

#[derive(Debug, Args)]
pub struct StartArgs {
    /// What you are working on.
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,

    /// Nest the new timer under this entry.
    #[arg(short, long)]
    pub parent: Option<EntryId>,

    /// When the work started (ISO 8601 or e.g. "5 minutes ago"). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &StartArgs,
    store: &mut EntryStore,
    now: DateTime<Utc>,
) -> Result<()> {
    let started_at = resolve_time(args.at.as_deref(), now)?;
    let entry = store.create(args.parent, &args.title.join(" "), started_at)?;

    match entry.parent_id {
        Some(parent) => writeln!(writer, "Started #{} {} (under #{parent})", entry.id, entry.title)?,
        None => writeln!(writer, "Started #{} {}", entry.id, entry.title)?,
    }
    Ok(())
}
