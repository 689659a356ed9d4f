//! Core type definitions.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a time entry.
///
/// Ids are allocated by the forest from a monotonic counter and are never
/// derived from timestamps, so two entries created in the same millisecond
/// still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    /// Wraps a raw id value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when an entry id cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid entry id {input:?}: {source}")]
pub struct ParseEntryIdError {
    input: String,
    #[source]
    source: ParseIntError,
}

impl FromStr for EntryId {
    type Err = ParseEntryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|source| ParseEntryIdError {
                input: s.to_string(),
                source,
            })
    }
}
