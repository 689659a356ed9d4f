//! List command: renders the entry forest as an indented tree.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};
use clap::Args;

use ht_core::{Entry, ExportScope, Forest, format_duration, format_timestamp};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show entries started today.
    #[arg(long)]
    pub today: bool,

    /// Output the entries as JSON instead of a tree.
    #[arg(long)]
    pub json: bool,
}

/// Message shown for an empty forest.
pub const EMPTY_MESSAGE: &str = "No time entries yet. Start tracking your time!";

/// Message shown by `--today` when entries exist but none started today.
pub const EMPTY_TODAY_MESSAGE: &str = "No time entries started today.";

const INDENT: &str = "  ";

/// Runs the list command against the forest as of `now`.
pub fn run<W: Write>(writer: &mut W, args: &ListArgs, forest: &Forest, now: DateTime<Utc>) -> Result<()> {
    let forest = forest.tick(now);
    let today = now.with_timezone(&Local).date_naive();

    if args.json {
        let scope = if args.today {
            ExportScope::Day(today)
        } else {
            ExportScope::All
        };
        writeln!(writer, "{}", forest.export(scope, &Local)?)?;
        return Ok(());
    }

    let roots: Vec<&Entry> = if args.today {
        forest
            .roots()
            .filter(|entry| entry.started_at.with_timezone(&Local).date_naive() == today)
            .collect()
    } else {
        forest.roots().collect()
    };

    if roots.is_empty() && !forest.is_empty() {
        writeln!(writer, "{EMPTY_TODAY_MESSAGE}")?;
        return Ok(());
    }
    write!(writer, "{}", render_tree(&forest, &roots, &Local))?;
    Ok(())
}

/// Renders `roots` and all of their descendants, newest first within each level.
pub fn render_tree<Tz>(forest: &Forest, roots: &[&Entry], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if roots.is_empty() {
        return format!("{EMPTY_MESSAGE}\n");
    }

    let mut output = String::new();

    // Depth-first with an explicit stack; children are pushed oldest first so
    // the newest pops first.
    let mut stack: Vec<(&Entry, usize)> = roots.iter().rev().map(|entry| (*entry, 0)).collect();
    while let Some((entry, depth)) = stack.pop() {
        output.push_str(&INDENT.repeat(depth));
        output.push_str(&render_line(entry, tz));
        output.push('\n');
        let children: Vec<&Entry> = forest.children_of(Some(entry.id)).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
    output
}

fn render_line<Tz>(entry: &Entry, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let marker = if entry.running { " ⏱" } else { "" };
    format!(
        "#{} {} – {}{}  (started {})",
        entry.id,
        entry.title,
        format_duration(entry.duration_ms),
        marker,
        format_timestamp(entry.started_at, tz),
    )
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use insta::assert_snapshot;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
    }

    fn sample() -> Forest {
        let forest = Forest::new();
        let (forest, spec) = forest.create(None, "Write spec", t0()).unwrap();
        let (forest, outline) = forest
            .create(Some(spec.id), "Draft outline", t0() + Duration::seconds(60))
            .unwrap();
        let (forest, _) = forest
            .create(Some(spec.id), "Review examples", t0() + Duration::seconds(120))
            .unwrap();
        let (forest, _) = forest
            .create(Some(outline.id), "Section headings", t0() + Duration::seconds(90))
            .unwrap();
        let (forest, email) = forest
            .create(None, "Email", t0() + Duration::seconds(300))
            .unwrap();
        let forest = forest
            .stop(outline.id, t0() + Duration::seconds(180))
            .unwrap();
        forest
            .stop(email.id, t0() + Duration::seconds(330))
            .unwrap()
            .tick(t0() + Duration::seconds(3_725))
    }

    #[test]
    fn renders_nested_tree_newest_first() {
        let forest = sample();
        let roots: Vec<&Entry> = forest.roots().collect();
        assert_snapshot!(render_tree(&forest, &roots, &Utc), @r"
        #5 Email – 00:00:30  (started 2026-01-01 09:05:00)
        #1 Write spec – 01:02:05 ⏱  (started 2026-01-01 09:00:00)
          #3 Review examples – 01:00:05 ⏱  (started 2026-01-01 09:02:00)
          #2 Draft outline – 00:02:00  (started 2026-01-01 09:01:00)
            #4 Section headings – 01:00:35 ⏱  (started 2026-01-01 09:01:30)
        ");
    }

    #[test]
    fn renders_empty_message() {
        let forest = Forest::new();
        assert_eq!(
            render_tree(&forest, &[], &Utc),
            format!("{EMPTY_MESSAGE}\n")
        );
    }

    #[test]
    fn today_without_matches_says_so() {
        let two_days_ago = Utc::now() - Duration::days(2);
        let (forest, _) = Forest::new().create(None, "Old task", two_days_ago).unwrap();
        let args = ListArgs {
            today: true,
            json: false,
        };

        let mut output = Vec::new();
        run(&mut output, &args, &forest, Utc::now()).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), format!("{EMPTY_TODAY_MESSAGE}\n"));

        let mut output = Vec::new();
        run(&mut output, &args, &Forest::new(), Utc::now()).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), format!("{EMPTY_MESSAGE}\n"));
    }

    #[test]
    fn run_ticks_before_rendering_json() {
        let (forest, entry) = Forest::new().create(None, "Task", t0()).unwrap();
        let mut output = Vec::new();
        let args = ListArgs {
            today: false,
            json: true,
        };
        run(&mut output, &args, &forest, t0() + Duration::seconds(42)).unwrap();

        let entries: Vec<Entry> = serde_json::from_slice(&output).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, entry.id);
        assert_eq!(entries[0].duration_ms, 42_000);
    }
}
