//! Export command: copies tracked entries as JSON to the clipboard.
//!
//! The first clipboard program that accepts the text wins. When none is
//! available the JSON is written to stdout instead.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, Utc};
use clap::Args;

use ht_core::{ExportScope, Forest};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Only export entries started today.
    #[arg(long)]
    pub today: bool,

    /// Print to stdout instead of copying to the clipboard.
    #[arg(long)]
    pub stdout: bool,
}

/// Destination for exported text.
pub trait Clipboard {
    /// Copies `text`, failing if no clipboard is reachable.
    fn copy(&self, text: &str) -> Result<()>;
}

/// Clipboard programs tried in order: Wayland, X11, macOS, Windows.
const CLIPBOARD_PROGRAMS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip", &[]),
];

/// The system clipboard, reached through external programs.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        for (program, args) in CLIPBOARD_PROGRAMS {
            match pipe_to(program, args, text) {
                Ok(()) => {
                    tracing::debug!(program, "copied export to clipboard");
                    return Ok(());
                }
                Err(err) => tracing::debug!(program, error = %err, "clipboard program unavailable"),
            }
        }
        bail!("no clipboard program available")
    }
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {program}"))?;

    child
        .stdin
        .take()
        .context("failed to capture clipboard stdin")?
        .write_all(text.as_bytes())
        .with_context(|| format!("failed to write to {program}"))?;

    let status = child
        .wait()
        .with_context(|| format!("failed to wait for {program}"))?;
    if !status.success() {
        bail!("{program} exited with status {status}");
    }
    Ok(())
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &ExportArgs,
    forest: &Forest,
    clipboard: &dyn Clipboard,
    now: DateTime<Utc>,
) -> Result<()> {
    let forest = forest.tick(now);
    let scope = if args.today {
        ExportScope::Day(now.with_timezone(&Local).date_naive())
    } else {
        ExportScope::All
    };
    let text = forest
        .export(scope, &Local)
        .context("failed to serialize entries")?;

    if args.stdout {
        writeln!(writer, "{text}")?;
        return Ok(());
    }

    match clipboard.copy(&text) {
        Ok(()) => eprintln!("Copied {} bytes to the clipboard.", text.len()),
        Err(err) => {
            tracing::warn!(error = %err, "clipboard unavailable, writing export to stdout");
            writeln!(writer, "{text}")?;
        }
    }
    Ok(())
}
