//! # Recordkeep Testkit
//!
//! Testing utilities for recordkeep.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Sample documents**: Known data files, valid and corrupt, with the
//!   outcome `load` must produce for each
//! - **Generators**: Proptest strategies for records and patches
//! - **Fixtures**: Seeded stores and libraries on an in-memory file system
//!
//! ## Sample Documents
//!
//! ```rust
//! use recordkeep_testkit::vectors::{all_documents, check_document};
//!
//! for doc in all_documents() {
//!     check_document(&doc).unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use recordkeep_testkit::generators::any_record;
//!
//! proptest! {
//!     #[test]
//!     fn create_then_get(r in any_record(6)) {
//!         let mut store = recordkeep_testkit::TestFixture::new().store;
//!         let id = store.create(r.clone()).unwrap();
//!         prop_assert_eq!(store.get(id.as_str()), Some(&r));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use recordkeep_testkit::fixtures::{record, TestFixture};
//! use serde_json::json;
//!
//! let mut fixture = TestFixture::new();
//! let id = fixture.store.create(record(json!({"title": "Dune"}))).unwrap();
//! assert!(fixture.store.get(id.as_str()).is_some());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{date, record, sample_book, LibraryFixture, TestFixture};
pub use generators::{any_patch, any_record, empty_patch, field_name, field_value};
pub use vectors::{
    all_documents, check_document, check_document_with, verify_all_documents, Expected,
    SampleDocument,
};
