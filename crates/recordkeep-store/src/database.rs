//! Database: several named collections saved together as one document.
//!
//! The document is a top-level object of collections, each an object of
//! records:
//!
//! ```text
//! {
//!     "books": { "BOOK1234": { ... } },
//!     "users": { "USER5678": { ... } },
//!     "borrowing_records": {}
//! }
//! ```

use std::path::Path;

use recordkeep_core::{IdGenerator, Record, RecordId};
use serde_json::Value;
use tracing::debug;

use crate::collection::Collection;
use crate::config::StoreConfig;
use crate::document;
use crate::error::{Result, StoreError};
use crate::fs::{FileSystem, OsFileSystem};
use crate::record_store::LoadOutcome;

/// Named collections persisted as a single JSON file.
///
/// Collections keep their registration order, which is also the order they
/// are written in.
#[derive(Debug)]
pub struct Database<F = OsFileSystem> {
    fs: F,
    config: StoreConfig,
    collections: Vec<(String, Collection)>,
}

impl Database<OsFileSystem> {
    /// Create an empty database on the real file system.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_fs(OsFileSystem, config)
    }
}

impl<F: FileSystem> Database<F> {
    /// Create an empty database on the given file system.
    pub fn with_fs(fs: F, config: StoreConfig) -> Self {
        Self {
            fs,
            config,
            collections: Vec::new(),
        }
    }

    /// Register a collection under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, collection: Collection) -> &mut Collection {
        let name = name.into();
        let index = match self.position(&name) {
            Some(index) => {
                self.collections[index].1 = collection;
                index
            }
            None => {
                self.collections.push((name, collection));
                self.collections.len() - 1
            }
        };
        &mut self.collections[index].1
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_collection(mut self, name: impl Into<String>, collection: Collection) -> Self {
        self.register(name, collection);
        self
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.collections.iter().position(|(n, _)| n == name)
    }

    /// Collection names in order.
    pub fn names(&self) -> Vec<&str> {
        self.collections.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Look up a collection.
    pub fn collection(&self, name: &str) -> Result<&Collection> {
        self.collections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    /// Look up a collection mutably.
    pub fn collection_mut(&mut self, name: &str) -> Result<&mut Collection> {
        self.collections
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    /// The file system backing this database.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations (by collection name)
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate and insert into `collection`; returns the new id.
    pub fn create(&mut self, collection: &str, record: Record) -> Result<RecordId> {
        self.collection_mut(collection)?.create(record)
    }

    /// Get a record from `collection`.
    pub fn get(&self, collection: &str, id: &str) -> Result<Option<&Record>> {
        Ok(self.collection(collection)?.get(id))
    }

    /// Merge supplied fields into a record of `collection`.
    pub fn update(&mut self, collection: &str, id: &str, patch: Record) -> Result<bool> {
        self.collection_mut(collection)?.update(id, patch)
    }

    /// Remove a record from `collection`.
    pub fn delete(&mut self, collection: &str, id: &str) -> Result<bool> {
        Ok(self.collection_mut(collection)?.delete(id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Write every collection to `path` atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let map = self
            .collections
            .iter()
            .map(|(name, c)| (name.clone(), c.to_document()))
            .collect();
        let bytes = document::encode(&Value::Object(map), self.config.pretty)?;

        self.fs
            .write_atomic(path, &bytes)
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), collections = self.collections.len(), "saved database");
        Ok(())
    }

    /// Replace every collection with the contents of `path`.
    ///
    /// Registered collections absent from the document become empty.
    /// Collections in the document that were never registered are added with
    /// the default id scheme and no validator. Nothing changes unless the
    /// whole document parses.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let path = path.as_ref();
        let bytes = self.fs.read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(bytes) = bytes else {
            debug!(path = %path.display(), "no data file, starting empty");
            for (_, c) in &mut self.collections {
                c.clear();
            }
            return Ok(LoadOutcome::Missing);
        };

        let map = document::decode(&bytes, path)?;
        let mut parsed = Vec::with_capacity(map.len());
        for (name, value) in map {
            let entries = Collection::parse_document(value).map_err(|reason| {
                StoreError::Corruption {
                    path: path.to_path_buf(),
                    reason: format!("collection {name:?}: {reason}"),
                }
            })?;
            parsed.push((name, entries));
        }

        for (_, c) in &mut self.collections {
            c.clear();
        }
        let mut total = 0;
        for (name, entries) in parsed {
            total += entries.len();
            if self.position(&name).is_none() {
                debug!(collection = %name, "adding unregistered collection");
                let c = self.new_collection();
                self.collections.push((name.clone(), c));
            }
            self.collection_mut(&name)?.replace_entries(entries);
        }

        debug!(path = %path.display(), records = total, "loaded database");
        Ok(LoadOutcome::Loaded(total))
    }

    /// Load `path`, resetting to a seeded default if the file is corrupt.
    pub fn load_or_default<S>(&mut self, path: impl AsRef<Path>, seed: S) -> Result<LoadOutcome>
    where
        S: FnOnce(&mut Self) -> Result<()>,
    {
        match self.load(path) {
            Err(StoreError::Corruption { reason, .. }) => {
                debug!(%reason, "data file corrupt, resetting to defaults");
                for (_, c) in &mut self.collections {
                    c.clear();
                }
                seed(self)?;
                Ok(LoadOutcome::Reset { reason })
            }
            other => other,
        }
    }

    fn new_collection(&self) -> Collection {
        let ids = match self.config.id_seed {
            Some(seed) => IdGenerator::with_seed(self.config.id_scheme.clone(), seed),
            None => IdGenerator::new(self.config.id_scheme.clone()),
        };
        Collection::with_generator(ids)
    }
}
