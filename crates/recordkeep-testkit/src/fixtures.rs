//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. Everything runs against a
//! [`MemoryFileSystem`] with seeded id generators, so ids repeat run to run.

use chrono::NaiveDate;
use recordkeep::{Library, LibraryConfig, NewBook};
use recordkeep_core::{Record, RecordId};
use recordkeep_store::{MemoryFileSystem, RecordStore, StoreConfig};
use serde_json::Value;

/// Seed used by every fixture.
pub const FIXTURE_SEED: u64 = 0x5eed;

/// Build a record from a JSON object literal.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Panics
///
/// Panics on a malformed date.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|e| panic!("bad date {s:?}: {e}"))
}

fn seeded_config() -> StoreConfig {
    StoreConfig {
        id_seed: Some(FIXTURE_SEED),
        ..StoreConfig::default()
    }
}

/// A seeded record store on an in-memory file system.
pub struct TestFixture {
    pub store: RecordStore<MemoryFileSystem>,
}

impl TestFixture {
    /// Create an empty store with default five-digit ids and no validation.
    pub fn new() -> Self {
        Self {
            store: RecordStore::with_fs(MemoryFileSystem::new(), seeded_config()),
        }
    }

    /// Create a store seeded with `count` records `{"n": i}`.
    pub fn with_records(count: usize) -> (Self, Vec<RecordId>) {
        let mut fixture = Self::new();
        let ids = (0..count)
            .map(|i| {
                fixture
                    .store
                    .create(record(serde_json::json!({ "n": i })))
                    .unwrap_or_else(|e| panic!("fixture record {i}: {e}"))
            })
            .collect();
        (fixture, ids)
    }

    /// The in-memory file system under the store.
    pub fn fs(&self) -> &MemoryFileSystem {
        self.store.fs()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A seeded library on an in-memory file system.
pub struct LibraryFixture {
    pub library: Library<MemoryFileSystem>,
}

impl LibraryFixture {
    /// Create an empty library with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LibraryConfig::default())
    }

    /// Create an empty library; the store section of `config` is seeded.
    pub fn with_config(config: LibraryConfig) -> Self {
        let config = LibraryConfig {
            store: seeded_config(),
            ..config
        };
        Self {
            library: Library::with_fs(MemoryFileSystem::new(), config),
        }
    }

    /// The in-memory file system under the library.
    pub fn fs(&self) -> &MemoryFileSystem {
        self.library.database().fs()
    }
}

impl Default for LibraryFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A valid book on the top shelf.
pub fn sample_book(title: &str, author: &str, copies: i64) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        isbn: String::new(),
        genre: String::new(),
        copies,
        location: "Top Shelf".to_string(),
    }
}
