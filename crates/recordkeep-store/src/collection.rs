//! Collection: an ordered, identifier-keyed set of records in memory.
//!
//! Listing follows insertion order. Order is tracked with a sequence number
//! per entry so deletes stay cheap.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use recordkeep_core::{
    is_supplied, AcceptAll, IdGenerator, IdScheme, Record, RecordId, Validator,
};
use serde_json::Value;
use tracing::debug;

use crate::document;
use crate::error::Result;

/// Result of inserting a record under a caller-supplied id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Record was inserted.
    Inserted,
    /// A record with this id already exists (left untouched, not an error).
    AlreadyExists,
}

struct Entry {
    /// Insertion sequence number, key into `order`.
    seq: u64,
    record: Record,
}

/// An ordered mapping from [`RecordId`] to [`Record`].
///
/// The collection owns its records: callers hand records in by value and
/// read them back by reference.
pub struct Collection {
    entries: HashMap<RecordId, Entry>,
    order: BTreeMap<u64, RecordId>,
    next_seq: u64,
    ids: IdGenerator,
    /// Widest id width handed out so far.
    id_width: u32,
    validator: Box<dyn Validator>,
}

impl Collection {
    /// Create an empty collection with default five-digit ids and no
    /// validation.
    pub fn new() -> Self {
        Self::with_generator(IdGenerator::new(IdScheme::default()))
    }

    /// Create an empty collection drawing ids from `scheme`.
    pub fn with_scheme(scheme: IdScheme) -> Self {
        Self::with_generator(IdGenerator::new(scheme))
    }

    /// Create an empty collection with an explicit generator (e.g. seeded).
    pub fn with_generator(ids: IdGenerator) -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
            id_width: ids.scheme().effective_width(0),
            ids,
            validator: Box::new(AcceptAll),
        }
    }

    /// Set the validator applied by `create`, `insert` and `update`.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Replace the validator in place.
    pub fn set_validator(&mut self, validator: impl Validator + 'static) {
        self.validator = Box::new(validator);
    }

    /// The id scheme of this collection.
    pub fn scheme(&self) -> &IdScheme {
        self.ids.scheme()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Produce an identifier not currently present in the collection.
    ///
    /// Only consumes randomness; nothing is reserved.
    pub fn generate_id(&mut self) -> RecordId {
        let occupied = self.entries.len();
        let width = self.ids.scheme().effective_width(occupied);
        if width > self.id_width {
            debug!(occupied, width, "id space widened");
            self.id_width = width;
        }

        let entries = &self.entries;
        self.ids
            .generate(occupied, |candidate| entries.contains_key(candidate))
    }

    /// Validate and insert a record under a freshly generated id.
    pub fn create(&mut self, record: Record) -> Result<RecordId> {
        self.validator.validate(&record)?;
        let id = self.generate_id();
        self.push(id.clone(), record);
        Ok(id)
    }

    /// Validate and insert a record under a caller-supplied id.
    ///
    /// An existing record under `id` is never overwritten.
    pub fn insert(&mut self, id: RecordId, record: Record) -> Result<InsertResult> {
        if self.entries.contains_key(&id) {
            return Ok(InsertResult::AlreadyExists);
        }
        self.validator.validate(&record)?;
        self.push(id, record);
        Ok(InsertResult::Inserted)
    }

    fn push(&mut self, id: RecordId, record: Record) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, id.clone());
        self.entries.insert(id, Entry { seq, record });
    }

    /// Get a record by id.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.entries.get(id).map(|e| &e.record)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Merge the supplied fields of `patch` into the record at `id`.
    ///
    /// Fields that are `null` or blank strings are not supplied and keep
    /// their current value. The merged record must pass the validator; if it
    /// does not, the stored record is left exactly as it was.
    ///
    /// Returns `Ok(false)` if no record has this id.
    pub fn update(&mut self, id: &str, patch: Record) -> Result<bool> {
        let Some(entry) = self.entries.get_mut(id) else {
            return Ok(false);
        };

        let mut merged = entry.record.clone();
        let mut changed = false;
        for (field, value) in patch {
            if is_supplied(&value) && merged.get(&field) != Some(&value) {
                merged.insert(field, value);
                changed = true;
            }
        }

        if changed {
            self.validator.validate(&merged)?;
            entry.record = merged;
        }
        Ok(true)
    }

    /// Remove a record. Returns whether one was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        match self.entries.remove(id) {
            Some(entry) => {
                self.order.remove(&entry.seq);
                true
            }
            None => false,
        }
    }

    /// Iterate over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &Record)> + '_ {
        self.order
            .values()
            .filter_map(move |id| self.entries.get(id).map(|e| (id, &e.record)))
    }

    /// Records matching `predicate`, in insertion order.
    pub fn list<P>(&self, predicate: P) -> Vec<(RecordId, Record)>
    where
        P: Fn(&RecordId, &Record) -> bool,
    {
        self.iter()
            .filter(|&(id, record)| predicate(id, record))
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    /// All records, in insertion order.
    pub fn list_all(&self) -> Vec<(RecordId, Record)> {
        self.list(|_, _| true)
    }

    /// All ids, in insertion order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.order.values().cloned().collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection has no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.next_seq = 0;
        self.id_width = self.ids.scheme().effective_width(0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Conversion
    // ─────────────────────────────────────────────────────────────────────────

    /// The collection as a JSON object `{ id: record }`.
    pub fn to_document(&self) -> Value {
        let map = self
            .iter()
            .map(|(id, record)| (id.to_string(), Value::Object(record.clone())))
            .collect();
        Value::Object(map)
    }

    /// Parse `{ id: record }` without touching any collection.
    ///
    /// Records are not validated: data on disk is taken as committed.
    pub(crate) fn parse_document(
        value: Value,
    ) -> std::result::Result<Vec<(RecordId, Record)>, String> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(format!(
                    "expected an object of records, found {}",
                    document::kind(&other)
                ))
            }
        };

        map.into_iter()
            .map(|(key, value)| {
                let id = RecordId::new(key.as_str()).map_err(|e| e.to_string())?;
                match value {
                    Value::Object(record) => Ok((id, record)),
                    other => Err(format!(
                        "record {key:?} is {}, expected an object",
                        document::kind(&other)
                    )),
                }
            })
            .collect()
    }

    /// Replace all records with already-parsed entries.
    pub(crate) fn replace_entries(&mut self, entries: Vec<(RecordId, Record)>) {
        self.clear();
        for (id, record) in entries {
            self.push(id, record);
        }
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("len", &self.len())
            .field("scheme", self.scheme())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordkeep_core::{contains_ci, FieldKind, Schema, ValidationError};
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;

    use crate::error::StoreError;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn books() -> Collection {
        Collection::with_generator(IdGenerator::with_seed(IdScheme::default(), 42)).with_validator(
            Schema::new()
                .field("title", FieldKind::NonEmptyString)
                .field("copies", FieldKind::PositiveInteger),
        )
    }

    #[test]
    fn test_create_and_get() {
        let mut c = books();
        let r = record(json!({"title": "Dune", "copies": 3}));
        let id = c.create(r.clone()).unwrap();

        assert_eq!(c.get(id.as_str()), Some(&r));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_create_rejects_invalid() {
        let mut c = books();
        let err = c
            .create(record(json!({"title": "Dune", "copies": 0})))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::NotPositive { .. })
        ));
        assert!(c.is_empty());
    }

    #[test]
    fn test_ids_are_distinct() {
        let mut c = Collection::with_generator(IdGenerator::with_seed(IdScheme::numeric(2), 3));
        let mut seen = HashSet::new();
        for i in 0..1000 {
            let id = c.create(record(json!({ "n": i }))).unwrap();
            assert!(seen.insert(id));
        }
        assert_eq!(c.len(), 1000);
    }

    #[test]
    fn test_id_width_tracks_widening_once() {
        let mut c = Collection::with_generator(IdGenerator::with_seed(IdScheme::numeric(1), 9));
        assert_eq!(c.id_width, 1);

        for i in 0..10 {
            c.create(record(json!({ "n": i }))).unwrap();
        }
        assert_eq!(c.id_width, 2);
        for i in 10..40 {
            c.create(record(json!({ "n": i }))).unwrap();
        }
        assert_eq!(c.id_width, 2);

        c.clear();
        assert_eq!(c.id_width, 1);
    }

    #[test]
    fn test_update_rejected_leaves_record() {
        let mut c = books();
        let id = c
            .create(record(json!({"title": "Dune", "copies": 3})))
            .unwrap();

        let err = c
            .update(id.as_str(), record(json!({"copies": 0})))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(c.get(id.as_str()).unwrap()["copies"], json!(3));

        // Negative replacements are just as invalid.
        assert!(c.update(id.as_str(), record(json!({"copies": -4}))).is_err());
        assert_eq!(c.get(id.as_str()).unwrap()["copies"], json!(3));
    }

    #[test]
    fn test_update_merges_supplied_fields() {
        let mut c = books();
        let id = c
            .create(record(json!({"title": "Dune", "copies": 3, "genre": "SF"})))
            .unwrap();

        let updated = c
            .update(
                id.as_str(),
                record(json!({"title": "", "copies": 5, "genre": null, "location": "Top Shelf"})),
            )
            .unwrap();
        assert!(updated);
        assert_eq!(
            c.get(id.as_str()),
            Some(&record(json!({
                "title": "Dune",
                "copies": 5,
                "genre": "SF",
                "location": "Top Shelf"
            })))
        );
    }

    #[test]
    fn test_update_empty_patch_is_noop() {
        let mut c = books();
        let id = c
            .create(record(json!({"title": "Dune", "copies": 3})))
            .unwrap();
        let before = c.get(id.as_str()).cloned();

        assert!(c.update(id.as_str(), Record::new()).unwrap());
        assert_eq!(c.get(id.as_str()).cloned(), before);
    }

    #[test]
    fn test_update_missing_returns_false() {
        let mut c = books();
        assert!(!c.update("00000", record(json!({"copies": 1}))).unwrap());
    }

    #[test]
    fn test_delete() {
        let mut c = books();
        let id = c
            .create(record(json!({"title": "Dune", "copies": 3})))
            .unwrap();

        assert!(c.delete(id.as_str()));
        assert!(c.get(id.as_str()).is_none());
        assert!(!c.delete(id.as_str()));
        assert!(c.is_empty());
    }

    #[test]
    fn test_insert_supplied_id() {
        let mut c = books();
        let id = RecordId::new("BOOK0001").unwrap();
        let r = record(json!({"title": "Emma", "copies": 1}));

        assert_eq!(c.insert(id.clone(), r.clone()).unwrap(), InsertResult::Inserted);
        assert_eq!(
            c.insert(id.clone(), record(json!({"title": "Other", "copies": 9})))
                .unwrap(),
            InsertResult::AlreadyExists
        );
        assert_eq!(c.get("BOOK0001"), Some(&r));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut c = Collection::new();
        for name in ["a", "b", "c", "d"] {
            c.insert(RecordId::new(name).unwrap(), record(json!({ "name": name })))
                .unwrap();
        }
        c.delete("b");
        c.insert(RecordId::new("b").unwrap(), record(json!({"name": "b"})))
            .unwrap();

        let ids: Vec<String> = c.ids().into_iter().map(RecordId::into_string).collect();
        assert_eq!(ids, vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn test_list_with_search() {
        let mut c = books();
        c.create(record(json!({"title": "Dune", "copies": 1, "author": "Frank Herbert"})))
            .unwrap();
        c.create(record(json!({"title": "Emma", "copies": 1, "author": "Jane Austen"})))
            .unwrap();
        c.create(record(json!({"title": "Dune Messiah", "copies": 2, "author": "Frank Herbert"})))
            .unwrap();

        let fields = ["title", "author"];
        let hits = c.list(contains_ci(&fields, "dune"));
        let titles: Vec<_> = hits.iter().map(|(_, r)| r["title"].clone()).collect();
        assert_eq!(titles, vec![json!("Dune"), json!("Dune Messiah")]);

        assert_eq!(c.list_all().len(), 3);
    }

    #[test]
    fn test_document_roundtrip_keeps_order() {
        let mut c = books();
        for title in ["Dune", "Emma", "Ulysses"] {
            c.create(record(json!({"title": title, "copies": 1}))).unwrap();
        }

        let entries = Collection::parse_document(c.to_document()).unwrap();
        let mut restored = Collection::new();
        restored.replace_entries(entries);

        assert_eq!(restored.list_all(), c.list_all());
    }

    #[test]
    fn test_parse_document_rejects_bad_shapes() {
        assert!(Collection::parse_document(json!([])).is_err());
        assert!(Collection::parse_document(json!({"1": 5})).is_err());
        assert!(Collection::parse_document(json!({"": {}})).is_err());
        assert!(Collection::parse_document(json!({})).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_listing_matches_model(ops in prop::collection::vec(0usize..8, 1..200)) {
            // op < 6 creates, otherwise deletes the op-th oldest surviving id
            let mut c = Collection::with_generator(IdGenerator::with_seed(IdScheme::numeric(3), 9));
            let mut model: Vec<RecordId> = Vec::new();
            for (i, op) in ops.into_iter().enumerate() {
                if op < 6 || model.is_empty() {
                    model.push(c.create(record(json!({ "n": i }))).unwrap());
                } else {
                    let victim = model.remove(op % model.len());
                    prop_assert!(c.delete(victim.as_str()));
                }
            }
            prop_assert_eq!(c.ids(), model);
        }
    }
}
