//! Wiring between the entry store and the key-value database.
//!
//! The store is seeded from the `timeEntries` key when a session opens, and
//! its change hook writes the serialized forest back after every mutation.
//! The id counter is written next to it under [`NEXT_ID_KEY`] so ids freed by
//! a delete are not handed out again by a later process.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};

use ht_core::{EntryStore, Forest, STORAGE_KEY};
use ht_db::Database;

use crate::Config;

/// Key that receives an unreadable blob before it is replaced.
pub const CORRUPT_BACKUP_KEY: &str = "timeEntries.corrupt";

/// Key holding the next id to allocate.
pub const NEXT_ID_KEY: &str = "timeEntries.nextId";

/// An entry store bound to its database.
pub struct Session {
    db: Rc<Database>,
    store: EntryStore,
    save_error: Rc<RefCell<Option<anyhow::Error>>>,
}

impl Session {
    /// Opens the configured database, creating its directory if needed.
    pub fn open(config: &Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create database directory")?;
        }
        let db = Database::open(&config.database_path)
            .with_context(|| format!("failed to open {}", config.database_path.display()))?;
        Self::with_database(db)
    }

    /// Loads the persisted forest from `db` and persists every change back to it.
    ///
    /// Unreadable data is copied to [`CORRUPT_BACKUP_KEY`] and the session
    /// starts with an empty forest.
    pub fn with_database(db: Database) -> Result<Self> {
        let db = Rc::new(db);
        let forest = match load_forest(&db)? {
            Ok(forest) => forest,
            Err((err, blob)) => {
                tracing::warn!(
                    error = %err,
                    backup_key = CORRUPT_BACKUP_KEY,
                    "persisted entries are unreadable, starting with an empty forest"
                );
                db.set(CORRUPT_BACKUP_KEY, &blob)
                    .context("failed to back up unreadable entries")?;
                Forest::new().with_next_id(read_next_id(&db)?)
            }
        };

        let save_error = Rc::new(RefCell::new(None));
        let hook_error = Rc::clone(&save_error);
        let hook_db = Rc::clone(&db);
        let store = EntryStore::from_forest(forest).with_on_change(move |forest| {
            if let Err(err) = save(&hook_db, forest) {
                tracing::error!(error = %err, "failed to persist entries");
                hook_error.borrow_mut().replace(err);
            }
        });

        Ok(Self {
            db,
            store,
            save_error,
        })
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntryStore {
        &mut self.store
    }

    /// Replaces the in-memory forest with what is currently persisted.
    ///
    /// Picks up changes made by other processes. An unreadable blob keeps the
    /// current forest.
    pub fn reload(&mut self) -> Result<()> {
        match load_forest(&self.db)? {
            Ok(forest) => self.store.replace(forest),
            Err((err, _)) => {
                tracing::warn!(error = %err, "persisted entries are unreadable, keeping last view");
            }
        }
        Ok(())
    }

    /// Surfaces the first persistence failure since the last call.
    pub fn flush(&self) -> Result<()> {
        match self.save_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

type LoadResult = std::result::Result<Forest, (ht_core::StoreError, String)>;

/// Reads the persisted forest. The inner error carries the rejected blob.
fn load_forest(db: &Database) -> Result<LoadResult> {
    let blob = db
        .get(STORAGE_KEY)
        .context("failed to read persisted entries")?;
    let next_id = read_next_id(db)?;

    let Some(blob) = blob else {
        return Ok(Ok(Forest::new().with_next_id(next_id)));
    };
    Ok(match Forest::deserialize(&blob) {
        Ok(forest) => Ok(forest.with_next_id(next_id)),
        Err(err) => Err((err, blob)),
    })
}

fn read_next_id(db: &Database) -> Result<u64> {
    let raw = db
        .get(NEXT_ID_KEY)
        .context("failed to read the id counter")?;
    Ok(raw
        .and_then(|raw| match raw.trim().parse() {
            Ok(next_id) => Some(next_id),
            Err(err) => {
                tracing::warn!(error = %err, value = %raw, "ignoring unreadable id counter");
                None
            }
        })
        .unwrap_or(0))
}

fn save(db: &Database, forest: &Forest) -> Result<()> {
    let blob = forest
        .serialize()
        .context("failed to serialize entries")?;
    let next_id = forest.next_id().to_string();
    db.set_all(&[(STORAGE_KEY, &blob), (NEXT_ID_KEY, &next_id)])
        .context("failed to write entries")
}
