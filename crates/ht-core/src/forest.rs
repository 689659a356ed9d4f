//! The forest of time entries.
//!
//! A [`Forest`] is an immutable snapshot: every mutation takes `&self` and
//! returns a new forest, leaving the original untouched. Entries are kept in
//! an id-indexed map alongside two derived indexes:
//!
//! - a parent → children index, so subtree walks never scan the whole forest
//! - the set of running ids, so a tick only touches running entries
//!
//! # Ordering
//!
//! Ids grow monotonically, so ascending id order is creation order.
//! [`Forest::children_of`] yields the most recently created child first.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::entry::Entry;
use crate::error::{CorruptState, StoreError};
use crate::types::EntryId;

/// An immutable snapshot of every time entry.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    entries: BTreeMap<EntryId, Entry>,
    children: BTreeMap<Option<EntryId>, BTreeSet<EntryId>>,
    running: BTreeSet<EntryId>,
    next_id: u64,
}

impl PartialEq for Forest {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Forest {}

impl Forest {
    /// Creates an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Mutations ==========

    /// Starts a new running entry under `parent_id` (or as a root).
    ///
    /// Returns the new forest together with the created entry.
    pub fn create(
        &self,
        parent_id: Option<EntryId>,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<(Self, Entry), StoreError> {
        let title = normalize_title(title)?;
        if let Some(parent) = parent_id {
            if !self.contains(parent) {
                return Err(StoreError::NotFound { id: parent });
            }
        }

        let id = EntryId::new(self.next_id.max(1));
        let next_id = id.get().checked_add(1).ok_or(StoreError::IdsExhausted)?;
        let entry = Entry::start(id, parent_id, title, now);

        let mut next = self.clone();
        next.next_id = next_id;
        next.insert(entry.clone());
        Ok((next, entry))
    }

    /// Stops a running entry, freezing its duration at `now`.
    pub fn stop(&self, id: EntryId, now: DateTime<Utc>) -> Result<Self, StoreError> {
        let entry = self.get(id).ok_or(StoreError::NotFound { id })?;
        if !entry.running {
            return Err(StoreError::AlreadyStopped { id });
        }

        let mut next = self.clone();
        if let Some(entry) = next.entries.get_mut(&id) {
            entry.finish(now);
        }
        next.running.remove(&id);
        Ok(next)
    }

    /// Replaces the title of an entry. Timing fields are untouched.
    pub fn rename(&self, id: EntryId, title: &str) -> Result<Self, StoreError> {
        let title = normalize_title(title)?;
        if !self.contains(id) {
            return Err(StoreError::NotFound { id });
        }

        let mut next = self.clone();
        if let Some(entry) = next.entries.get_mut(&id) {
            entry.title = title;
        }
        Ok(next)
    }

    /// Removes an entry together with all of its descendants.
    pub fn delete(&self, id: EntryId) -> Result<Self, StoreError> {
        if !self.contains(id) {
            return Err(StoreError::NotFound { id });
        }

        let doomed: Vec<EntryId> = std::iter::once(id)
            .chain(self.descendants_of(id).map(|entry| entry.id))
            .collect();

        let mut next = self.clone();
        for doomed_id in &doomed {
            next.remove(*doomed_id);
        }
        Ok(next)
    }

    /// Recomputes the duration of every running entry at `now`.
    ///
    /// Only running entries are recomputed, but building the new snapshot
    /// copies the whole forest.
    pub fn tick(&self, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        for id in &self.running {
            if let Some(entry) = next.entries.get_mut(id) {
                entry.duration_ms = entry.elapsed_ms(now);
            }
        }
        next
    }

    /// Removes every entry. Ids are still never reused afterwards.
    pub fn clear(&self) -> Self {
        Self {
            next_id: self.next_id,
            ..Self::default()
        }
    }

    /// Raises the id counter so no id below `next_id` is handed out again.
    ///
    /// The counter never moves backwards, so a stale value is harmless.
    #[must_use]
    pub fn with_next_id(mut self, next_id: u64) -> Self {
        self.next_id = self.next_id.max(next_id);
        self
    }

    // ========== Queries ==========

    /// The id the next created entry will receive.
    pub fn next_id(&self) -> EntryId {
        EntryId::new(self.next_id.max(1))
    }

    /// Number of entries in the forest.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the forest holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if an entry with `id` exists.
    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    /// All entries in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.values()
    }

    /// Root entries, most recently created first.
    pub fn roots(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.children_of(None)
    }

    /// Direct children of `parent_id` (`None` for roots), most recently created first.
    ///
    /// An unknown parent simply has no children.
    pub fn children_of(&self, parent_id: Option<EntryId>) -> impl Iterator<Item = &Entry> + '_ {
        self.child_ids(parent_id)
            .rev()
            .filter_map(|id| self.entries.get(id))
    }

    /// All transitive descendants of `id`, breadth first.
    ///
    /// The entry itself is not included. An unknown id has no descendants.
    pub fn descendants_of(&self, id: EntryId) -> Descendants<'_> {
        let mut queue = VecDeque::new();
        if self.contains(id) {
            queue.extend(self.child_ids(Some(id)).rev().copied());
        }
        Descendants {
            forest: self,
            queue,
        }
    }

    /// Entries whose start falls on `date` in the time zone `tz`.
    pub fn entries_started_on<'a, Tz>(
        &'a self,
        date: NaiveDate,
        tz: &'a Tz,
    ) -> impl Iterator<Item = &'a Entry> + 'a
    where
        Tz: TimeZone + 'a,
    {
        self.entries
            .values()
            .filter(move |entry| entry.started_at.with_timezone(tz).date_naive() == date)
    }

    /// Entries whose start falls on `date` in the local time zone.
    pub fn entries_started_on_local_date(
        &self,
        date: NaiveDate,
    ) -> impl Iterator<Item = &Entry> + '_ {
        self.entries
            .values()
            .filter(move |entry| entry.started_at.with_timezone(&Local).date_naive() == date)
    }

    /// All running entries in creation order.
    pub fn currently_running(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.running.iter().filter_map(|id| self.entries.get(id))
    }

    /// The running entry with the latest start; ties go to the newest entry.
    pub fn most_recently_started_running(&self) -> Option<&Entry> {
        self.currently_running()
            .max_by_key(|entry| (entry.started_at_epoch_ms, entry.id))
    }

    // ========== Persistence ==========

    /// Encodes the forest as a JSON array of entry records in creation order.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        let records: Vec<&Entry> = self.entries.values().collect();
        serde_json::to_string(&records)
    }

    /// Decodes a blob produced by [`Forest::serialize`].
    ///
    /// Any record that breaks a forest invariant rejects the whole blob;
    /// nothing is dropped or repaired.
    pub fn deserialize(blob: &str) -> Result<Self, StoreError> {
        let records: Vec<Entry> = serde_json::from_str(blob)
            .map_err(|err| CorruptState::Malformed(err.to_string()))?;
        Ok(Self::from_entries(records)?)
    }

    /// Builds a forest from records, validating every invariant.
    pub fn from_entries(records: Vec<Entry>) -> Result<Self, CorruptState> {
        let mut forest = Self::new();
        for entry in records {
            validate_record(&entry)?;
            if forest.contains(entry.id) {
                return Err(CorruptState::DuplicateId(entry.id));
            }
            let after = entry
                .id
                .get()
                .checked_add(1)
                .ok_or(CorruptState::IdOverflow(entry.id))?;
            forest.next_id = forest.next_id.max(after);
            forest.insert(entry);
        }

        for entry in forest.entries.values() {
            if let Some(parent) = entry.parent_id {
                if parent == entry.id {
                    return Err(CorruptState::Cycle(entry.id));
                }
                if !forest.contains(parent) {
                    return Err(CorruptState::DanglingParent {
                        id: entry.id,
                        parent,
                    });
                }
            }
        }

        // With every parent present, anything unreachable from the roots sits on a cycle.
        let reachable: HashSet<EntryId> = forest
            .child_ids(None)
            .flat_map(|root| std::iter::once(*root).chain(forest.descendants_of(*root).map(|e| e.id)))
            .collect();
        if let Some(orphan) = forest.entries.keys().find(|id| !reachable.contains(id)) {
            return Err(CorruptState::Cycle(*orphan));
        }

        Ok(forest)
    }

    // ========== Internals ==========

    fn child_ids(
        &self,
        parent_id: Option<EntryId>,
    ) -> impl DoubleEndedIterator<Item = &EntryId> + '_ {
        self.children.get(&parent_id).into_iter().flatten()
    }

    fn insert(&mut self, entry: Entry) {
        self.children
            .entry(entry.parent_id)
            .or_default()
            .insert(entry.id);
        if entry.running {
            self.running.insert(entry.id);
        }
        self.entries.insert(entry.id, entry);
    }

    fn remove(&mut self, id: EntryId) {
        let Some(entry) = self.entries.remove(&id) else {
            return;
        };
        if let Some(siblings) = self.children.get_mut(&entry.parent_id) {
            siblings.remove(&id);
            if siblings.is_empty() {
                self.children.remove(&entry.parent_id);
            }
        }
        self.children.remove(&Some(id));
        self.running.remove(&id);
    }
}

/// Breadth-first iterator over the descendants of an entry.
///
/// Created by [`Forest::descendants_of`]. Children are expanded lazily as the
/// iterator advances.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    forest: &'a Forest,
    queue: VecDeque<EntryId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.queue.pop_front() {
            if let Some(entry) = self.forest.entries.get(&id) {
                self.queue
                    .extend(self.forest.child_ids(Some(id)).rev().copied());
                return Some(entry);
            }
        }
        None
    }
}

fn normalize_title(title: &str) -> Result<String, StoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn validate_record(entry: &Entry) -> Result<(), CorruptState> {
    if entry.title.trim().is_empty() {
        return Err(CorruptState::BlankTitle(entry.id));
    }
    if entry.duration_ms < 0 {
        return Err(CorruptState::NegativeDuration(entry.id));
    }
    if entry.started_at.timestamp_millis() != entry.started_at_epoch_ms {
        return Err(CorruptState::TimestampMismatch(entry.id));
    }
    match (entry.running, entry.ended_at) {
        (true, Some(_)) => Err(CorruptState::RunningWithEnd(entry.id)),
        (false, None) => Err(CorruptState::StoppedWithoutEnd(entry.id)),
        (false, Some(ended_at)) => {
            let span = ended_at.timestamp_millis() - entry.started_at_epoch_ms;
            if span < 0 {
                Err(CorruptState::EndBeforeStart(entry.id))
            } else if span != entry.duration_ms {
                Err(CorruptState::DurationMismatch(entry.id))
            } else {
                Ok(())
            }
        }
        (true, None) => Ok(()),
    }
}
