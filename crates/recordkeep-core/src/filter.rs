//! Predicates for listing records.

use serde_json::Value;

use crate::types::{Record, RecordId};

/// Match records where any of `fields` contains `needle`, ignoring case.
///
/// Only string fields are searched. An empty (or blank) needle matches
/// nothing.
pub fn contains_ci<'a>(
    fields: &'a [&'a str],
    needle: &str,
) -> impl Fn(&RecordId, &Record) -> bool + 'a {
    let needle = needle.trim().to_lowercase();
    move |_, record| {
        !needle.is_empty()
            && fields.iter().any(|field| {
                record
                    .get(*field)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
    }
}

/// Match records whose `field` equals `value` exactly.
pub fn field_eq<'a>(field: &'a str, value: Value) -> impl Fn(&RecordId, &Record) -> bool + 'a {
    move |_, record| record.get(field) == Some(&value)
}
