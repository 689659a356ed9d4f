//! Errors raised by entry store operations.

use thiserror::Error;

use crate::types::EntryId;

/// Errors returned by forest and store operations.
///
/// A failed operation never changes the forest.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The title was empty after trimming.
    #[error("title cannot be empty")]
    EmptyTitle,

    /// No entry with the given id exists.
    #[error("entry not found: {id}")]
    NotFound { id: EntryId },

    /// The entry has already been stopped.
    #[error("entry already stopped: {id}")]
    AlreadyStopped { id: EntryId },

    /// Every id up to `u64::MAX` has been handed out.
    #[error("no entry ids left to allocate")]
    IdsExhausted,

    /// Persisted data could not be loaded.
    #[error("corrupt persisted state: {0}")]
    CorruptState(#[from] CorruptState),
}

/// The reason a persisted blob was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorruptState {
    /// The blob is not a JSON array of entry records.
    #[error("malformed entry data: {0}")]
    Malformed(String),

    /// Two records share an id.
    #[error("duplicate entry id {0}")]
    DuplicateId(EntryId),

    /// A record points at a parent that is not in the blob.
    #[error("entry {id} references missing parent {parent}")]
    DanglingParent { id: EntryId, parent: EntryId },

    /// A record is its own ancestor.
    #[error("entry {0} is part of a parent cycle")]
    Cycle(EntryId),

    /// A record has a blank title.
    #[error("entry {0} has a blank title")]
    BlankTitle(EntryId),

    /// A record has a negative duration.
    #[error("entry {0} has a negative duration")]
    NegativeDuration(EntryId),

    /// `startedAtISO` and `startedAtEpochMs` disagree.
    #[error("entry {0} has mismatched start timestamps")]
    TimestampMismatch(EntryId),

    /// A running record carries an end time.
    #[error("entry {0} is running but has an end time")]
    RunningWithEnd(EntryId),

    /// A stopped record is missing its end time.
    #[error("entry {0} is stopped but has no end time")]
    StoppedWithoutEnd(EntryId),

    /// A stopped record ends before it starts.
    #[error("entry {0} ends before it starts")]
    EndBeforeStart(EntryId),

    /// A stopped record's duration is not the span between start and end.
    #[error("entry {0} has a duration that does not match its start and end")]
    DurationMismatch(EntryId),

    /// A record uses the largest possible id, leaving none for new entries.
    #[error("entry id {0} leaves no room for new entries")]
    IdOverflow(EntryId),
}
