//! Rename command for editing an entry title.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use ht_core::{EntryId, EntryStore};

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Entry to rename.
    pub id: EntryId,

    /// New title.
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &RenameArgs, store: &mut EntryStore) -> Result<()> {
    let entry = store.rename(args.id, &args.title.join(" "))?;
    writeln!(writer, "Renamed #{} to {}", entry.id, entry.title)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn renames_entry() {
        let mut store = EntryStore::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let entry = store.create(None, "Old", t0).unwrap();

        let mut output = Vec::new();
        let args = RenameArgs {
            id: entry.id,
            title: vec!["New".into(), "title".into()],
        };
        run(&mut output, &args, &mut store).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "Renamed #1 to New title\n");
        assert_eq!(store.forest().get(entry.id).unwrap().title, "New title");
    }

    #[test]
    fn blank_title_keeps_old_one() {
        let mut store = EntryStore::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let entry = store.create(None, "Old", t0).unwrap();

        let args = RenameArgs {
            id: entry.id,
            title: vec!["   ".into()],
        };
        assert!(run(&mut Vec::new(), &args, &mut store).is_err());
        assert_eq!(store.forest().get(entry.id).unwrap().title, "Old");
    }
}
