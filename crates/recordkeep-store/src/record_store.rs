//! RecordStore: a single collection persisted as one JSON document.

use std::path::Path;

use recordkeep_core::{IdGenerator, Record, RecordId, Validator};
use tracing::debug;

use crate::collection::{Collection, InsertResult};
use crate::config::StoreConfig;
use crate::document;
use crate::error::{Result, StoreError};
use crate::fs::{FileSystem, OsFileSystem};

/// What `load` found on disk.
///
/// The store never prints; callers use this to tell the user what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file was read; this many records are now in memory.
    Loaded(usize),
    /// No file at the path; the store is now empty (first run).
    Missing,
    /// The file was corrupt and the store was reset to its defaults.
    Reset { reason: String },
}

/// An identifier-keyed record store backed by a JSON file.
///
/// # Concurrency
///
/// Single process, single writer. Every operation runs to completion against
/// the in-memory collection; only `save` touches durable storage. Callers
/// embedding the store in a concurrent program must serialize access.
#[derive(Debug)]
pub struct RecordStore<F = OsFileSystem> {
    fs: F,
    config: StoreConfig,
    records: Collection,
}

impl RecordStore<OsFileSystem> {
    /// Create an empty store on the real file system.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_fs(OsFileSystem, config)
    }
}

impl Default for RecordStore<OsFileSystem> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl<F: FileSystem> RecordStore<F> {
    /// Create an empty store on the given file system.
    pub fn with_fs(fs: F, config: StoreConfig) -> Self {
        let ids = match config.id_seed {
            Some(seed) => IdGenerator::with_seed(config.id_scheme.clone(), seed),
            None => IdGenerator::new(config.id_scheme.clone()),
        };
        Self {
            fs,
            config,
            records: Collection::with_generator(ids),
        }
    }

    /// Set the validator applied on create and update.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.records.set_validator(validator);
        self
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The file system backing this store.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// The in-memory collection.
    pub fn collection(&self) -> &Collection {
        &self.records
    }

    /// Mutable access to the in-memory collection.
    pub fn collection_mut(&mut self) -> &mut Collection {
        &mut self.records
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Produce an identifier not currently in the store.
    pub fn generate_id(&mut self) -> RecordId {
        self.records.generate_id()
    }

    /// Validate and insert a record; returns its new id.
    pub fn create(&mut self, record: Record) -> Result<RecordId> {
        self.records.create(record)
    }

    /// Validate and insert a record under a caller-supplied id.
    pub fn insert(&mut self, id: RecordId, record: Record) -> Result<InsertResult> {
        self.records.insert(id, record)
    }

    /// Get a record by id.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Merge supplied fields into a record. `Ok(false)` if absent.
    pub fn update(&mut self, id: &str, patch: Record) -> Result<bool> {
        self.records.update(id, patch)
    }

    /// Remove a record. Returns whether one was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        self.records.delete(id)
    }

    /// Records matching `predicate`, in insertion order.
    pub fn list<P>(&self, predicate: P) -> Vec<(RecordId, Record)>
    where
        P: Fn(&RecordId, &Record) -> bool,
    {
        self.records.list(predicate)
    }

    /// All records, in insertion order.
    pub fn list_all(&self) -> Vec<(RecordId, Record)> {
        self.records.list_all()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Write every record to `path` atomically.
    ///
    /// The previous file stays intact if the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = document::encode(&self.records.to_document(), self.config.pretty)?;

        self.fs
            .write_atomic(path, &bytes)
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), records = self.records.len(), "saved records");
        Ok(())
    }

    /// Replace the in-memory records with the contents of `path`.
    ///
    /// - Missing file: store becomes empty, `Ok(LoadOutcome::Missing)`.
    /// - Corrupt file: `Err(StoreError::Corruption)`, store unchanged.
    /// - Other I/O failure: `Err(StoreError::Io)`, store unchanged.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let path = path.as_ref();
        let bytes = self.fs.read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(bytes) = bytes else {
            debug!(path = %path.display(), "no data file, starting empty");
            self.records.clear();
            return Ok(LoadOutcome::Missing);
        };

        let map = document::decode(&bytes, path)?;
        let entries = Collection::parse_document(serde_json::Value::Object(map)).map_err(
            |reason| StoreError::Corruption {
                path: path.to_path_buf(),
                reason,
            },
        )?;

        let count = entries.len();
        self.records.replace_entries(entries);
        debug!(path = %path.display(), records = count, "loaded records");
        Ok(LoadOutcome::Loaded(count))
    }

    /// Load `path`, resetting to a seeded default if the file is corrupt.
    ///
    /// `seed` runs against the emptied collection, e.g. to create a default
    /// record. I/O errors are still returned.
    pub fn load_or_default<S>(&mut self, path: impl AsRef<Path>, seed: S) -> Result<LoadOutcome>
    where
        S: FnOnce(&mut Collection) -> Result<()>,
    {
        match self.load(path) {
            Err(StoreError::Corruption { reason, .. }) => {
                debug!(%reason, "data file corrupt, resetting to defaults");
                self.records.clear();
                seed(&mut self.records)?;
                Ok(LoadOutcome::Reset { reason })
            }
            other => other,
        }
    }
}
