//! # Recordkeep Core
//!
//! Pure primitives for recordkeep: record identifiers, identifier generation,
//! validation, and search filters.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! JSON-shaped records.
//!
//! ## Key Types
//!
//! - [`Record`] - An opaque mapping of field names to JSON values
//! - [`RecordId`] - A non-empty string key, unique within a collection
//! - [`IdScheme`] / [`IdGenerator`] - Collision-free identifier generation
//! - [`Validator`] / [`Schema`] - The validation extension point
//!
//! ## Records
//!
//! Records are `serde_json` objects. Field order is preserved (the workspace
//! enables `preserve_order`), but carries no meaning.

pub mod error;
pub mod filter;
pub mod id;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use filter::{contains_ci, field_eq};
pub use id::{IdGenerator, IdScheme};
pub use types::{from_record, is_supplied, to_record, Record, RecordId};
pub use validation::{AcceptAll, FieldKind, FieldRule, Schema, Validator};
