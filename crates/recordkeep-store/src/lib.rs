//! # Recordkeep Store
//!
//! Identifier-keyed record collections with atomic JSON persistence.
//!
//! ## Overview
//!
//! A [`Collection`] holds records in memory, keyed by generated identifiers
//! and listed in insertion order. A [`RecordStore`] persists one collection
//! as a JSON object `{ id: record }`; a [`Database`] persists several named
//! collections in a single document. Both reach the disk only through the
//! [`FileSystem`] trait.
//!
//! ## Key Types
//!
//! - [`RecordStore`] - One collection backed by one JSON file
//! - [`Database`] - Named collections backed by one JSON file
//! - [`Collection`] - In-memory CRUD with validation and id generation
//! - [`FileSystem`] - Whole-file read and atomic replace
//! - [`OsFileSystem`] - Temp file + rename on the real file system
//! - [`MemoryFileSystem`] - In-memory files with failure injection, for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use recordkeep_store::{LoadOutcome, RecordStore, StoreConfig};
//! use recordkeep_core::{FieldKind, Schema};
//! use serde_json::json;
//!
//! fn example() -> recordkeep_store::Result<()> {
//!     let mut store = RecordStore::new(StoreConfig::default()).with_validator(
//!         Schema::new()
//!             .field("title", FieldKind::NonEmptyString)
//!             .field("copies", FieldKind::PositiveInteger),
//!     );
//!
//!     if store.load("books.json")? == LoadOutcome::Missing {
//!         // first run
//!     }
//!
//!     let record = json!({"title": "Dune", "copies": 3});
//!     let id = store.create(record.as_object().cloned().unwrap_or_default())?;
//!     assert!(store.get(id.as_str()).is_some());
//!
//!     store.save("books.json")
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Not found is not an error**: `get` returns `Option`, `update` and
//!   `delete` return `bool`
//! - **Validation before mutation**: a rejected create or update changes
//!   nothing
//! - **All-or-nothing load**: a corrupt file leaves the in-memory state as it
//!   was
//! - **Silent core**: the store returns outcomes and errors; it only emits
//!   `tracing` debug events

pub mod collection;
pub mod config;
pub mod database;
pub mod document;
pub mod error;
pub mod fs;
pub mod memory;
pub mod record_store;

pub use collection::{Collection, InsertResult};
pub use config::StoreConfig;
pub use database::Database;
pub use error::{Result, StoreError};
pub use fs::{FileSystem, OsFileSystem};
pub use memory::MemoryFileSystem;
pub use record_store::{LoadOutcome, RecordStore};
