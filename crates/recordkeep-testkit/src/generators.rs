//! Proptest generators for property-based testing.

use proptest::prelude::*;

use recordkeep_core::Record;
use serde_json::Value;

/// Generate a field name.
pub fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,11}".prop_map(String::from)
}

/// Generate a scalar or shallow array field value.
///
/// No floats: values must survive a save/load round trip bit for bit.
pub fn field_value() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "\\PC{0,24}".prop_map(Value::String),
    ];
    prop_oneof![
        4 => scalar.clone(),
        1 => prop::collection::vec(scalar, 0..4).prop_map(Value::Array),
    ]
}

/// Generate a record with up to `max_fields` fields.
pub fn any_record(max_fields: usize) -> impl Strategy<Value = Record> {
    prop::collection::btree_map(field_name(), field_value(), 0..=max_fields)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Generate a patch that only carries "not supplied" values.
pub fn empty_patch() -> impl Strategy<Value = Record> {
    let blank = prop_oneof![
        Just(Value::Null),
        "[ \t]{0,4}".prop_map(Value::String),
    ];
    prop::collection::btree_map(field_name(), blank, 0..6)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Generate a patch mixing supplied and blank values.
pub fn any_patch() -> impl Strategy<Value = Record> {
    any_record(6)
}
