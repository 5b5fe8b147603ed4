//! Ready-made schemas for the record kinds the terminal tools keep.
//!
//! Each kind is a plain record shape; there is no type hierarchy. A doctor
//! and a patient are just two schemas.

use recordkeep_core::{FieldKind, Schema};

/// Default shelf locations for books.
pub const SHELVES: [&str; 3] = ["Top Shelf", "Middle Shelf", "Bottom Shelf"];

/// Task priorities.
pub const PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];

/// Task statuses.
pub const STATUSES: [&str; 3] = ["To Do", "In Progress", "Done"];

fn name_rule() -> FieldKind {
    FieldKind::Text {
        min_len: 2,
        max_len: 50,
        letters_only: true,
    }
}

/// A library book.
///
/// `copies` is the number owned and must be positive; `available` counts
/// copies on the shelf and may reach zero.
pub fn book<I, S>(shelves: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Schema::new()
        .field("title", FieldKind::NonEmptyString)
        .field("author", FieldKind::NonEmptyString)
        .optional("isbn", FieldKind::String)
        .optional("genre", FieldKind::String)
        .field("copies", FieldKind::PositiveInteger)
        .field("available", FieldKind::NonNegativeInteger)
        .field("location", FieldKind::one_of(shelves))
}

/// A library member or administrator.
pub fn user() -> Schema {
    Schema::new()
        .field("name", FieldKind::NonEmptyString)
        .field("role", FieldKind::one_of(["admin", "member"]))
        .optional("join_date", FieldKind::Date)
}

/// An active loan of one book to one user.
pub fn loan() -> Schema {
    Schema::new()
        .field("user_id", FieldKind::NonEmptyString)
        .field("book_id", FieldKind::NonEmptyString)
        .field("borrow_date", FieldKind::Date)
        .field("due_date", FieldKind::Date)
        .field("status", FieldKind::one_of(["borrowed"]))
}

/// A student with per-subject grades.
pub fn student() -> Schema {
    Schema::new()
        .field("name", name_rule())
        .field("grades", FieldKind::Object)
}

/// A to-do item.
pub fn task() -> Schema {
    Schema::new()
        .field("title", FieldKind::NonEmptyString)
        .optional("description", FieldKind::String)
        .field("due_date", FieldKind::Date)
        .field("priority", FieldKind::one_of(PRIORITIES))
        .field("status", FieldKind::one_of(STATUSES))
}

/// A hospital patient.
pub fn patient() -> Schema {
    Schema::new()
        .field("name", name_rule())
        .field("age", FieldKind::PositiveInteger)
        .optional("gender", FieldKind::String)
        .optional("contact_info", FieldKind::String)
        .optional("medical_history", FieldKind::Array)
}

/// A doctor with weekly availability.
pub fn doctor() -> Schema {
    Schema::new()
        .field("name", name_rule())
        .field("specialty", FieldKind::NonEmptyString)
        .optional("available_days", FieldKind::Array)
}

/// A scheduled appointment between a doctor and a patient.
pub fn appointment() -> Schema {
    Schema::new()
        .field("doctor_id", FieldKind::NonEmptyString)
        .field("patient_id", FieldKind::NonEmptyString)
        .field("date", FieldKind::Date)
        .field("time", FieldKind::NonEmptyString)
        .optional("reason", FieldKind::String)
        .field("status", FieldKind::one_of(["Scheduled", "Cancelled"]))
}
