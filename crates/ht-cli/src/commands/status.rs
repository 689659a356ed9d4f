//! Status command: the title line for the currently tracked entry.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};

use ht_core::{Forest, window_title};

pub fn run<W: Write>(
    writer: &mut W,
    forest: &Forest,
    default_title: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let forest = forest.tick(now);
    writeln!(writer, "{}", window_title(&forest, default_title))?;

    let running = forest.currently_running().count();
    if running > 1 {
        writeln!(writer, "{running} timers running")?;
    }
    Ok(())
}
