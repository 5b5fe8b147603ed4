//! Sample data files for load verification.
//!
//! Each document is the raw contents of a data file together with what
//! loading it into an empty [`RecordStore`] must produce.

use std::path::Path;

use recordkeep_store::{FileSystem, LoadOutcome, MemoryFileSystem, RecordStore, StoreConfig};

/// Expected result of loading a sample document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// Loads, yielding this many records.
    Loaded(usize),
    /// Rejected as corrupt.
    Corrupt,
}

/// A sample data file.
#[derive(Debug, Clone)]
pub struct SampleDocument {
    /// Human-readable name for the document.
    pub name: &'static str,
    /// Raw file contents.
    pub contents: &'static str,
    /// What `load` must do with it.
    pub expected: Expected,
}

/// Get all sample documents.
pub fn all_documents() -> Vec<SampleDocument> {
    vec![
        SampleDocument {
            name: "empty object",
            contents: "{}",
            expected: Expected::Loaded(0),
        },
        SampleDocument {
            name: "pretty-printed books",
            contents: r#"{
    "48213": {
        "title": "Dune",
        "author": "Frank Herbert",
        "copies": 3
    },
    "90511": {
        "title": "Emma",
        "author": "Jane Austen",
        "copies": 1
    }
}
"#,
            expected: Expected::Loaded(2),
        },
        SampleDocument {
            name: "committed data that would fail validation today",
            contents: r#"{"10001": {"title": "", "copies": 0}}"#,
            expected: Expected::Loaded(1),
        },
        SampleDocument {
            name: "unicode fields",
            contents: r#"{"BOOK1234": {"title": "Cien años de soledad", "tags": ["novela", "clásico"]}}"#,
            expected: Expected::Loaded(1),
        },
        SampleDocument {
            name: "truncated write",
            contents: "not json{",
            expected: Expected::Corrupt,
        },
        SampleDocument {
            name: "empty file",
            contents: "",
            expected: Expected::Corrupt,
        },
        SampleDocument {
            name: "top-level array",
            contents: "[1, 2, 3]",
            expected: Expected::Corrupt,
        },
        SampleDocument {
            name: "record is not an object",
            contents: r#"{"12345": "Dune"}"#,
            expected: Expected::Corrupt,
        },
        SampleDocument {
            name: "empty identifier",
            contents: r#"{"": {"title": "Dune"}}"#,
            expected: Expected::Corrupt,
        },
    ]
}

/// Load `doc` into a fresh store and compare with its expectation.
pub fn check_document(doc: &SampleDocument) -> Result<(), String> {
    let fs = MemoryFileSystem::new();
    fs.put("sample.json", doc.contents);
    check_document_with(doc, fs, "sample.json")
}

/// Load `doc`, already written to `path` on `fs`, into a fresh store and
/// compare with its expectation.
pub fn check_document_with<F: FileSystem>(
    doc: &SampleDocument,
    fs: F,
    path: impl AsRef<Path>,
) -> Result<(), String> {
    let mut store = RecordStore::with_fs(fs, StoreConfig::default());

    let actual = match store.load(path) {
        Ok(LoadOutcome::Loaded(n)) => Expected::Loaded(n),
        Ok(other) => return Err(format!("{}: unexpected outcome {other:?}", doc.name)),
        Err(e) if e.is_corruption() => Expected::Corrupt,
        Err(e) => return Err(format!("{}: unexpected error {e}", doc.name)),
    };

    if actual == doc.expected {
        Ok(())
    } else {
        Err(format!(
            "{}: expected {:?}, got {actual:?}",
            doc.name, doc.expected
        ))
    }
}

/// Check every sample document, collecting failures.
pub fn verify_all_documents() -> Vec<String> {
    all_documents()
        .iter()
        .filter_map(|doc| check_document(doc).err())
        .collect()
}
