//! The entry store - single owner of the current forest snapshot.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::entry::Entry;
use crate::error::StoreError;
use crate::forest::Forest;
use crate::types::EntryId;

type ChangeHook = Box<dyn FnMut(&Forest)>;

/// A destructive action that needs the user's confirmation before it runs.
///
/// The store only describes the action; the host asks the user and then
/// passes it back to [`EntryStore::confirm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Delete every entry in the forest.
    ClearAll { entries: usize },
}

impl PendingAction {
    /// Question to put to the user.
    pub fn prompt(&self) -> String {
        match self {
            Self::ClearAll { entries: 1 } => "Delete the only entry?".to_string(),
            Self::ClearAll { entries } => format!("Delete all {entries} entries?"),
        }
    }
}

/// Owns the forest and applies every change to it.
///
/// Each successful mutation swaps in a new snapshot and then calls the
/// change hook, which the host wires to persistence. Failed operations
/// leave the snapshot as it was and do not call the hook.
///
/// The store is meant to live on one thread; readers that need a stable
/// view take a [`snapshot`](Self::snapshot).
pub struct EntryStore {
    forest: Arc<Forest>,
    on_change: Option<ChangeHook>,
}

impl fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryStore")
            .field("entries", &self.forest.len())
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore {
    /// Creates a store with an empty forest.
    pub fn new() -> Self {
        Self::from_forest(Forest::new())
    }

    /// Creates a store seeded with an existing forest.
    pub fn from_forest(forest: Forest) -> Self {
        Self {
            forest: Arc::new(forest),
            on_change: None,
        }
    }

    /// Creates a store from a previously persisted blob.
    ///
    /// `None` means nothing was persisted yet and yields an empty store.
    pub fn init(blob: Option<&str>) -> Result<Self, StoreError> {
        let forest = match blob {
            Some(blob) => Forest::deserialize(blob)?,
            None => Forest::new(),
        };
        tracing::debug!(entries = forest.len(), "entry store initialized");
        Ok(Self::from_forest(forest))
    }

    /// Registers the hook called after every successful mutation.
    #[must_use]
    pub fn with_on_change(mut self, hook: impl FnMut(&Forest) + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    /// The current snapshot.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// A shared handle to the current snapshot that outlives later mutations.
    pub fn snapshot(&self) -> Arc<Forest> {
        Arc::clone(&self.forest)
    }

    /// Swaps in a forest loaded from elsewhere without calling the change hook.
    pub fn replace(&mut self, forest: Forest) {
        tracing::debug!(entries = forest.len(), "entry store replaced");
        self.forest = Arc::new(forest);
    }

    /// Starts a new entry. See [`Forest::create`].
    pub fn create(
        &mut self,
        parent_id: Option<EntryId>,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Entry, StoreError> {
        let (next, entry) = self.forest.create(parent_id, title, now)?;
        tracing::debug!(id = %entry.id, parent = ?entry.parent_id, title = %entry.title, "entry started");
        self.commit(next);
        Ok(entry)
    }

    /// Stops a running entry and returns its final state.
    pub fn stop(&mut self, id: EntryId, now: DateTime<Utc>) -> Result<Entry, StoreError> {
        let next = self.forest.stop(id, now)?;
        let entry = next.get(id).cloned().ok_or(StoreError::NotFound { id })?;
        tracing::debug!(%id, duration_ms = entry.duration_ms, "entry stopped");
        self.commit(next);
        Ok(entry)
    }

    /// Renames an entry and returns its new state.
    pub fn rename(&mut self, id: EntryId, title: &str) -> Result<Entry, StoreError> {
        let next = self.forest.rename(id, title)?;
        let entry = next.get(id).cloned().ok_or(StoreError::NotFound { id })?;
        tracing::debug!(%id, title = %entry.title, "entry renamed");
        self.commit(next);
        Ok(entry)
    }

    /// Deletes an entry and its descendants, returning how many were removed.
    pub fn delete(&mut self, id: EntryId) -> Result<usize, StoreError> {
        let next = self.forest.delete(id)?;
        let removed = self.forest.len() - next.len();
        tracing::debug!(%id, removed, "entry subtree deleted");
        self.commit(next);
        Ok(removed)
    }

    /// Refreshes running durations.
    ///
    /// The change hook only fires when something is running.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.forest.currently_running().next().is_none() {
            return;
        }
        let next = self.forest.tick(now);
        self.commit(next);
    }

    /// Describes clearing the whole forest, or `None` if it is already empty.
    pub fn request_clear(&self) -> Option<PendingAction> {
        if self.forest.is_empty() {
            return None;
        }
        Some(PendingAction::ClearAll {
            entries: self.forest.len(),
        })
    }

    /// Runs an action the user has confirmed.
    pub fn confirm(&mut self, action: PendingAction) {
        match action {
            PendingAction::ClearAll { .. } => {
                let removed = self.forest.len();
                let next = self.forest.clear();
                tracing::debug!(removed, "all entries cleared");
                self.commit(next);
            }
        }
    }

    fn commit(&mut self, next: Forest) {
        self.forest = Arc::new(next);
        if let Some(hook) = self.on_change.as_mut() {
            hook(self.forest.as_ref());
        }
    }
}
