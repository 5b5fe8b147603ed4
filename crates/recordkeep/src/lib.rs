//! # Recordkeep
//!
//! The unified API for recordkeep: identifier-keyed record stores persisted
//! as JSON documents, with collision-free id generation and pluggable
//! validation.
//!
//! ## Overview
//!
//! - **Records**: flat JSON objects keyed by a short random identifier
//! - **Stores**: an in-memory collection plus atomic save/load of one file
//! - **Validation**: schemas or closures run on create and update
//! - **Library**: a ready-made collaborator for books, users, and loans
//!
//! ## Key Guarantees
//!
//! - Generated ids never collide with ids already in the collection.
//! - A failed validation leaves the collection unchanged.
//! - `save` either replaces the file completely or leaves it untouched.
//! - `load` of a corrupt file is an error and changes nothing in memory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use recordkeep::{presets, RecordStore, StoreConfig};
//! use serde_json::json;
//!
//! fn example() -> recordkeep::store::Result<()> {
//!     let mut store = RecordStore::new(StoreConfig::default()).with_validator(presets::task());
//!     store.load("tasks.json")?;
//!
//!     let record = match json!({
//!         "title": "Write report",
//!         "due_date": "2030-01-15",
//!         "priority": "High",
//!         "status": "To Do"
//!     }) {
//!         serde_json::Value::Object(map) => map,
//!         _ => unreachable!(),
//!     };
//!     let id = store.create(record)?;
//!     println!("created task {id}");
//!
//!     store.save("tasks.json")
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `recordkeep::core` - Ids, records, validation, filters
//! - `recordkeep::store` - Collections, stores, file systems

pub mod error;
pub mod library;
pub mod presets;

// Re-export component crates
pub use recordkeep_core as core;
pub use recordkeep_store as store;

// Re-export main types for convenience
pub use error::{LibraryError, Result};
pub use library::{
    Book, Library, LibraryConfig, Loan, NewBook, OverdueLoan, ReturnReceipt, Role, StockReport,
    User, UserActivity,
};

pub use recordkeep_core::{
    contains_ci, field_eq, from_record, to_record, FieldKind, IdScheme, Record, RecordId, Schema,
    ValidationError, Validator,
};
pub use recordkeep_store::{
    Collection, Database, InsertResult, LoadOutcome, MemoryFileSystem, OsFileSystem,
    RecordStore, StoreConfig, StoreError,
};
