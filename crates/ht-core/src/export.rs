//! Export of tracked entries as JSON text.
//!
//! The core only produces the text; copying it anywhere is up to the host.

use chrono::{NaiveDate, TimeZone};

use crate::entry::Entry;
use crate::forest::Forest;

/// Which entries to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// Every entry in the forest.
    All,
    /// Entries started on the given calendar day.
    Day(NaiveDate),
}

impl Forest {
    /// Selected entries as pretty-printed JSON, in creation order.
    ///
    /// `tz` decides which calendar day an entry belongs to.
    pub fn export<Tz: TimeZone>(
        &self,
        scope: ExportScope,
        tz: &Tz,
    ) -> Result<String, serde_json::Error> {
        let records: Vec<&Entry> = match scope {
            ExportScope::All => self.iter().collect(),
            ExportScope::Day(date) => self.entries_started_on(date, tz).collect(),
        };
        serde_json::to_string_pretty(&records)
    }
}
