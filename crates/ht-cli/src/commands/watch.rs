//! Watch command: live view driven by a periodic tick.
//!
//! Every tick reloads the persisted forest, so changes made by other `ht`
//! commands show up, then redraws it with running durations refreshed and
//! updates the terminal title. Refreshed durations are never written back.
//! Ctrl-C ends the loop; the interval is dropped with it and the title guard
//! restores the default title.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tokio::time::{self, MissedTickBehavior};

use ht_core::{Entry, Forest, window_title};

use super::list::render_tree;
use crate::Config;
use crate::session::Session;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Sets the terminal title and restores `default` when dropped.
pub struct TitleGuard<W: Write> {
    writer: W,
    default: String,
}

impl<W: Write> TitleGuard<W> {
    pub fn new(writer: W, default: &str) -> Self {
        Self {
            writer,
            default: default.to_string(),
        }
    }

    pub fn set(&mut self, title: &str) -> std::io::Result<()> {
        write!(self.writer, "\x1b]0;{title}\x07")?;
        self.writer.flush()
    }
}

impl<W: Write> Drop for TitleGuard<W> {
    fn drop(&mut self) {
        let default = std::mem::take(&mut self.default);
        if let Err(err) = self.set(&default) {
            tracing::debug!(error = %err, "failed to reset terminal title");
        }
    }
}

/// Runs the watch loop until Ctrl-C.
pub async fn run(session: &mut Session, config: &Config) -> Result<()> {
    let mut ticker = time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut title = TitleGuard::new(std::io::stdout(), &config.default_title);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::debug!(interval_ms = config.tick_interval_ms, "watch loop started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.reload()?;
                let forest = session.store().forest().tick(Utc::now());
                redraw(&forest, config, &mut title)?;
            }
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }
    tracing::debug!("watch loop stopped");
    Ok(())
}

fn redraw<W: Write>(forest: &Forest, config: &Config, title: &mut TitleGuard<W>) -> Result<()> {
    let roots: Vec<&Entry> = forest.roots().collect();

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{CLEAR_SCREEN}{}", render_tree(forest, &roots, &Local))?;
    writeln!(stdout, "\nPress Ctrl-C to exit.")?;
    stdout.flush()?;
    drop(stdout);

    title.set(&window_title(forest, &config.default_title))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_guard_resets_on_drop() {
        let mut buffer = Vec::new();
        {
            let mut guard = TitleGuard::new(&mut buffer, "Time Tracker");
            guard.set("Write spec – 00:00:05").unwrap();
        }
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "\x1b]0;Write spec – 00:00:05\x07\x1b]0;Time Tracker\x07"
        );
    }
}
