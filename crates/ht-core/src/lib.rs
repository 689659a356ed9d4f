//! Core domain logic for the hierarchical time tracker.
//!
//! This crate contains the entry tree model and its operations:
//! - Entries: timed tasks nested under optional parents
//! - Forest: an immutable snapshot of every entry, with pure mutations and queries
//! - Store: the single owner of the current snapshot, with a change hook for persistence
//! - Formatting: durations, timestamps and window titles for display

mod entry;
mod error;
pub mod export;
pub mod format;
mod forest;
mod store;
mod types;

pub use entry::Entry;
pub use error::{CorruptState, StoreError};
pub use export::ExportScope;
pub use format::{format_duration, format_timestamp, window_title};
pub use forest::{Descendants, Forest};
pub use store::{EntryStore, PendingAction};
pub use types::{EntryId, ParseEntryIdError};

/// Key under which the serialized forest is persisted.
pub const STORAGE_KEY: &str = "timeEntries";
