//! The Library: books, users, and borrowing records on one data file.
//!
//! Three collections share one document:
//!
//! - `books`: `BOOK####` ids, validated by [`presets::book`] plus the rule
//!   that `available` never exceeds `copies`
//! - `users`: `USER####` ids, plus the seeded `ADMIN001` account
//! - `borrowing_records`: one record per active loan, keyed `<user>:<book>`
//!
//! Dates are passed in by the caller, so every operation is deterministic.

use std::path::Path;

use chrono::{Days, NaiveDate};
use recordkeep_core::{
    contains_ci, field_eq, from_record, is_supplied, to_record, IdGenerator, IdScheme, Record,
    RecordId, ValidationError, Validator,
};
use recordkeep_store::{
    Collection, Database, FileSystem, LoadOutcome, OsFileSystem, StoreConfig, StoreError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{LibraryError, Result};
use crate::presets;

/// Collection name for books.
pub const BOOKS: &str = "books";
/// Collection name for users.
pub const USERS: &str = "users";
/// Collection name for active loans.
pub const LOANS: &str = "borrowing_records";

/// Id of the administrator account created on first run.
pub const ADMIN_ID: &str = "ADMIN001";

const LOAN_STATUS_BORROWED: &str = "borrowed";

/// Configuration for the Library.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Days from borrowing to the due date.
    pub loan_days: u64,
    /// Late fee per day overdue, in cents.
    pub late_fee_cents_per_day: u64,
    /// Allowed book locations.
    pub shelves: Vec<String>,
    /// Storage configuration. The id scheme is ignored; each collection uses
    /// its own prefix.
    pub store: StoreConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            loan_days: 14,
            late_fee_cents_per_day: 100,
            shelves: presets::SHELVES.iter().map(|s| s.to_string()).collect(),
            store: StoreConfig::default(),
        }
    }
}

/// A book as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub genre: String,
    /// Copies owned.
    pub copies: i64,
    /// Copies on the shelf.
    pub available: i64,
    pub location: String,
}

impl Book {
    /// Copies currently on loan.
    pub fn on_loan(&self) -> i64 {
        self.copies.saturating_sub(self.available)
    }
}

/// Input for [`Library::add_book`]. Every copy starts on the shelf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub copies: i64,
    pub location: String,
}

/// A user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// A library user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub role: Role,
    /// Registration date. The seeded admin account has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
}

/// A member and the loans they currently hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivity {
    pub id: RecordId,
    pub user: User,
    pub active_loans: usize,
}

/// An active loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub user_id: String,
    pub book_id: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
}

impl Loan {
    /// Whole days past the due date as of `today` (zero if not late).
    pub fn days_late(&self, today: NaiveDate) -> u64 {
        u64::try_from((today - self.due_date).num_days()).unwrap_or(0)
    }
}

/// What a return cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub days_late: u64,
    pub late_fee_cents: u64,
}

/// An overdue loan as of some date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueLoan {
    pub loan: Loan,
    pub days_overdue: u64,
    pub late_fee_cents: u64,
}

/// Copy counts across every book.
///
/// Totals are `i128` so any number of `i64` counts sums without overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockReport {
    pub titles: usize,
    pub total_copies: i128,
    pub borrowed_copies: i128,
    pub available_copies: i128,
}

fn loan_key(user_id: &str, book_id: &str) -> String {
    format!("{user_id}:{book_id}")
}

fn generator(scheme: IdScheme, seed: Option<u64>) -> IdGenerator {
    match seed {
        Some(seed) => IdGenerator::with_seed(scheme, seed),
        None => IdGenerator::new(scheme),
    }
}

fn book_validator(shelves: &[String]) -> impl Validator {
    let schema = presets::book(shelves.iter().cloned());
    move |record: &Record| -> std::result::Result<(), ValidationError> {
        schema.validate(record)?;
        // Counts are read back as i64.
        for field in ["copies", "available"] {
            if record.get(field).is_some_and(|v| v.as_i64().is_none()) {
                return Err(ValidationError::WrongType {
                    field: field.to_string(),
                    expected: "an integer within i64 range",
                });
            }
        }
        let copies = record.get("copies").and_then(Value::as_i64);
        let available = record.get("available").and_then(Value::as_i64);
        if let (Some(copies), Some(available)) = (copies, available) {
            if available > copies {
                return Err(ValidationError::Custom(format!(
                    "available ({available}) exceeds copies ({copies})"
                )));
            }
        }
        Ok(())
    }
}

/// The library management system.
#[derive(Debug)]
pub struct Library<F = OsFileSystem> {
    db: Database<F>,
    config: LibraryConfig,
}

impl Library<OsFileSystem> {
    /// Create an empty library on the real file system.
    pub fn new(config: LibraryConfig) -> Self {
        Self::with_fs(OsFileSystem, config)
    }
}

impl<F: FileSystem> Library<F> {
    /// Create an empty library on the given file system.
    pub fn with_fs(fs: F, config: LibraryConfig) -> Self {
        let seed = config.store.id_seed;
        let books = Collection::with_generator(generator(IdScheme::prefixed("BOOK", 4), seed))
            .with_validator(book_validator(&config.shelves));
        let users = Collection::with_generator(generator(
            IdScheme::prefixed("USER", 4),
            seed.map(|s| s.wrapping_add(1)),
        ))
        .with_validator(presets::user());
        let loans = Collection::new().with_validator(presets::loan());

        let db = Database::with_fs(fs, config.store.clone())
            .with_collection(BOOKS, books)
            .with_collection(USERS, users)
            .with_collection(LOANS, loans);

        Self { db, config }
    }

    /// The library configuration.
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// The underlying database.
    pub fn database(&self) -> &Database<F> {
        &self.db
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Books
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a book with every copy available; returns its id.
    pub fn add_book(&mut self, book: NewBook) -> Result<RecordId> {
        let book = Book {
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            genre: book.genre,
            copies: book.copies,
            available: book.copies,
            location: book.location,
        };
        let id = self.db.create(BOOKS, to_record(&book)?)?;
        info!(book = %id, title = %book.title, "added book");
        Ok(id)
    }

    /// Look up a book.
    pub fn book(&self, id: &str) -> Result<Book> {
        let record = self
            .db
            .get(BOOKS, id)?
            .ok_or_else(|| LibraryError::BookNotFound(id.to_string()))?;
        Ok(from_record(record)?)
    }

    /// All books, in insertion order.
    pub fn books(&self) -> Result<Vec<(RecordId, Book)>> {
        self.typed(BOOKS, |_, _| true)
    }

    /// Merge the supplied fields of `patch` into a book.
    ///
    /// Changing `copies` without supplying `available` shifts `available` by
    /// the same amount, so copies on loan stay on loan. The edit is rejected
    /// if it would leave more available copies than owned ones.
    pub fn edit_book(&mut self, id: &str, mut patch: Record) -> Result<()> {
        let current = self.book(id)?;

        if let Some(copies) = patch.get("copies").and_then(Value::as_i64) {
            if !patch.get("available").is_some_and(is_supplied) {
                let on_loan = current.on_loan();
                let available = copies.checked_sub(on_loan).ok_or_else(|| {
                    StoreError::from(ValidationError::Custom(format!(
                        "copies ({copies}) cannot cover {on_loan} on loan"
                    )))
                })?;
                patch.insert("available".into(), json!(available));
            }
        }

        self.db.update(BOOKS, id, patch)?;
        info!(book = id, "edited book");
        Ok(())
    }

    /// Remove a book. Fails while any copy is on loan.
    pub fn remove_book(&mut self, id: &str) -> Result<()> {
        if !self.db.collection(BOOKS)?.contains(id) {
            return Err(LibraryError::BookNotFound(id.to_string()));
        }
        let holds_book = field_eq("book_id", json!(id));
        if self
            .db
            .collection(LOANS)?
            .iter()
            .any(|(key, record)| holds_book(key, record))
        {
            return Err(LibraryError::BookOnLoan(id.to_string()));
        }

        self.db.delete(BOOKS, id)?;
        info!(book = id, "removed book");
        Ok(())
    }

    /// Books whose title or author contains `term`, ignoring case.
    pub fn search_books(&self, term: &str) -> Result<Vec<(RecordId, Book)>> {
        self.typed(BOOKS, contains_ci(&["title", "author"], term))
    }

    /// Copy counts across the catalogue.
    pub fn stock_report(&self) -> Result<StockReport> {
        let mut report = StockReport::default();
        for (_, book) in self.books()? {
            report.titles += 1;
            report.total_copies += i128::from(book.copies);
            report.borrowed_copies += i128::from(book.on_loan());
            report.available_copies += i128::from(book.available);
        }
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a member joining on `today`; returns their id.
    pub fn register_user(&mut self, name: &str, today: NaiveDate) -> Result<RecordId> {
        let user = User {
            name: name.trim().to_string(),
            role: Role::Member,
            join_date: Some(today),
        };
        let id = self.db.create(USERS, to_record(&user)?)?;
        info!(user = %id, "registered user");
        Ok(id)
    }

    /// Look up a user.
    pub fn user(&self, id: &str) -> Result<User> {
        let record = self
            .db
            .get(USERS, id)?
            .ok_or_else(|| LibraryError::UserNotFound(id.to_string()))?;
        Ok(from_record(record)?)
    }

    /// All users, in insertion order.
    pub fn users(&self) -> Result<Vec<(RecordId, User)>> {
        self.typed(USERS, |_, _| true)
    }

    /// Every member with their join date and active loan count.
    pub fn user_activity(&self) -> Result<Vec<UserActivity>> {
        let loans = self.db.collection(LOANS)?;
        Ok(self
            .users()?
            .into_iter()
            .filter(|(_, user)| user.role == Role::Member)
            .map(|(id, user)| {
                let holds = field_eq("user_id", json!(id.as_str()));
                let active_loans = loans.iter().filter(|&(k, r)| holds(k, r)).count();
                UserActivity {
                    id,
                    user,
                    active_loans,
                }
            })
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loans
    // ─────────────────────────────────────────────────────────────────────────

    /// Lend one copy of `book_id` to `user_id`.
    ///
    /// The book's available count drops by exactly one. A user holds at
    /// most one copy of a given book.
    pub fn borrow(&mut self, user_id: &str, book_id: &str, today: NaiveDate) -> Result<Loan> {
        self.user(user_id)?;
        let book = self.book(book_id)?;

        let key = loan_key(user_id, book_id);
        if self.db.collection(LOANS)?.contains(&key) {
            return Err(LibraryError::AlreadyBorrowed {
                user: user_id.to_string(),
                book: book_id.to_string(),
            });
        }
        if book.available <= 0 {
            return Err(LibraryError::NoCopiesAvailable(book_id.to_string()));
        }

        let due_date = today
            .checked_add_days(Days::new(self.config.loan_days))
            .unwrap_or(NaiveDate::MAX);
        let loan = Loan {
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            borrow_date: today,
            due_date,
            status: LOAN_STATUS_BORROWED.to_string(),
        };

        let id = RecordId::new(key).map_err(StoreError::from)?;
        self.db
            .collection_mut(LOANS)?
            .insert(id.clone(), to_record(&loan)?)?;

        let mut patch = Record::new();
        patch.insert("available".into(), json!(book.available - 1));
        if let Err(e) = self.db.update(BOOKS, book_id, patch) {
            self.db.delete(LOANS, id.as_str())?;
            return Err(e.into());
        }

        info!(user = user_id, book = book_id, due = %due_date, "borrowed book");
        Ok(loan)
    }

    /// Return a borrowed copy and compute the late fee.
    pub fn return_book(
        &mut self,
        user_id: &str,
        book_id: &str,
        today: NaiveDate,
    ) -> Result<ReturnReceipt> {
        let key = loan_key(user_id, book_id);
        let record = self
            .db
            .get(LOANS, &key)?
            .ok_or_else(|| LibraryError::NotBorrowed {
                user: user_id.to_string(),
                book: book_id.to_string(),
            })?;
        let loan: Loan = from_record(record)?;

        let days_late = loan.days_late(today);
        let receipt = ReturnReceipt {
            days_late,
            late_fee_cents: days_late.saturating_mul(self.config.late_fee_cents_per_day),
        };

        match self.book(book_id) {
            Ok(book) => {
                let mut patch = Record::new();
                patch.insert(
                    "available".into(),
                    json!(book.available.saturating_add(1).min(book.copies)),
                );
                self.db.update(BOOKS, book_id, patch)?;
            }
            Err(LibraryError::BookNotFound(_)) => {
                warn!(book = book_id, "returned book is no longer catalogued");
            }
            Err(e) => return Err(e),
        }
        self.db.delete(LOANS, &key)?;

        if days_late > 0 {
            warn!(
                user = user_id,
                book = book_id,
                days_late,
                fee_cents = receipt.late_fee_cents,
                "late return"
            );
        } else {
            info!(user = user_id, book = book_id, "returned book");
        }
        Ok(receipt)
    }

    /// Active loans held by `user_id`.
    pub fn loans_for(&self, user_id: &str) -> Result<Vec<Loan>> {
        Ok(self
            .typed::<Loan, _>(LOANS, field_eq("user_id", json!(user_id)))?
            .into_iter()
            .map(|(_, loan)| loan)
            .collect())
    }

    /// Loans past their due date as of `today`.
    pub fn overdue(&self, today: NaiveDate) -> Result<Vec<OverdueLoan>> {
        let fee = self.config.late_fee_cents_per_day;
        Ok(self
            .typed::<Loan, _>(LOANS, |_, _| true)?
            .into_iter()
            .filter_map(|(_, loan)| {
                let days_overdue = loan.days_late(today);
                (days_overdue > 0).then(|| OverdueLoan {
                    late_fee_cents: days_overdue.saturating_mul(fee),
                    days_overdue,
                    loan,
                })
            })
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Write every collection to `path` atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(self.db.save(path)?)
    }

    /// Replace every collection with the contents of `path`.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        Ok(self.db.load(path)?)
    }

    /// Load `path`, creating the admin account on first run or after a
    /// corrupt file.
    pub fn load_or_default(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let outcome = self
            .db
            .load_or_default(path, |db| Self::seed_admin(db.collection_mut(USERS)?))?;

        match &outcome {
            LoadOutcome::Missing => {
                Self::seed_admin(self.db.collection_mut(USERS)?)?;
                info!("no data file, created admin account");
            }
            LoadOutcome::Reset { reason } => {
                warn!(%reason, "data file corrupt, library reset");
            }
            LoadOutcome::Loaded(n) => info!(records = *n, "library loaded"),
        }
        Ok(outcome)
    }

    fn seed_admin(users: &mut Collection) -> recordkeep_store::Result<()> {
        let admin = User {
            name: "System Admin".to_string(),
            role: Role::Admin,
            join_date: None,
        };
        users.insert(RecordId::new(ADMIN_ID)?, to_record(&admin)?)?;
        Ok(())
    }

    fn typed<T, P>(&self, collection: &str, predicate: P) -> Result<Vec<(RecordId, T)>>
    where
        T: serde::de::DeserializeOwned,
        P: Fn(&RecordId, &Record) -> bool,
    {
        self.db
            .collection(collection)?
            .iter()
            .filter(|&(id, record)| predicate(id, record))
            .map(|(id, record)| -> Result<(RecordId, T)> {
                Ok((id.clone(), from_record(record)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordkeep_store::MemoryFileSystem;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn library() -> Library<MemoryFileSystem> {
        let config = LibraryConfig {
            store: StoreConfig {
                id_seed: Some(7),
                ..StoreConfig::default()
            },
            ..LibraryConfig::default()
        };
        Library::with_fs(MemoryFileSystem::new(), config)
    }

    fn dune(copies: i64) -> NewBook {
        NewBook {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            isbn: "9780441013593".into(),
            genre: "Science Fiction".into(),
            copies,
            location: "Top Shelf".into(),
        }
    }

    fn patch(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_add_book() {
        let mut lib = library();
        let id = lib.add_book(dune(3)).unwrap();

        assert!(id.as_str().starts_with("BOOK"));
        assert_eq!(id.as_str().len(), 8);
        let book = lib.book(id.as_str()).unwrap();
        assert_eq!(book.copies, 3);
        assert_eq!(book.available, 3);
    }

    #[test]
    fn test_add_book_rejects_zero_copies() {
        let mut lib = library();
        let err = lib.add_book(dune(0)).unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::NotPositive { field, value: 0 }) if field == "copies"
        ));
        assert!(lib.books().unwrap().is_empty());
    }

    #[test]
    fn test_add_book_rejects_unknown_shelf() {
        let mut lib = library();
        let mut book = dune(1);
        book.location = "Basement".into();
        assert!(lib.add_book(book).unwrap_err().validation().is_some());
    }

    #[test]
    fn test_edit_book_keeps_loans() {
        let mut lib = library();
        let book = lib.add_book(dune(3)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();
        lib.borrow(user.as_str(), book.as_str(), date("2030-01-01")).unwrap();

        lib.edit_book(book.as_str(), patch(json!({"copies": 5, "title": ""})))
            .unwrap();
        let edited = lib.book(book.as_str()).unwrap();
        assert_eq!(edited.title, "Dune");
        assert_eq!(edited.copies, 5);
        assert_eq!(edited.available, 4);
    }

    #[test]
    fn test_edit_book_rejects_available_over_copies() {
        let mut lib = library();
        let book = lib.add_book(dune(2)).unwrap();

        let err = lib
            .edit_book(book.as_str(), patch(json!({"available": 3})))
            .unwrap_err();
        assert!(matches!(err.validation(), Some(ValidationError::Custom(_))));
        assert_eq!(lib.book(book.as_str()).unwrap().available, 2);
    }

    #[test]
    fn test_edit_book_rejects_copies_beyond_i64() {
        let mut lib = library();
        let book = lib.add_book(dune(2)).unwrap();

        let err = lib
            .edit_book(book.as_str(), patch(json!({"copies": u64::MAX})))
            .unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::WrongType { field, .. }) if field == "copies"
        ));

        // The catalogue stays readable.
        assert_eq!(lib.books().unwrap().len(), 1);
        assert_eq!(lib.book(book.as_str()).unwrap().copies, 2);
    }

    #[test]
    fn test_edit_book_rejects_copies_that_underflow_loans() {
        let mut lib = library();
        let book = lib.add_book(dune(2)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();
        lib.borrow(user.as_str(), book.as_str(), date("2030-01-01"))
            .unwrap();

        let err = lib
            .edit_book(book.as_str(), patch(json!({"copies": i64::MIN})))
            .unwrap_err();
        assert!(matches!(err.validation(), Some(ValidationError::Custom(_))));

        let unchanged = lib.book(book.as_str()).unwrap();
        assert_eq!((unchanged.copies, unchanged.available), (2, 1));
    }

    #[test]
    fn test_edit_missing_book() {
        let mut lib = library();
        assert!(matches!(
            lib.edit_book("BOOK0000", Record::new()),
            Err(LibraryError::BookNotFound(_))
        ));
    }

    #[test]
    fn test_search_books() {
        let mut lib = library();
        lib.add_book(dune(1)).unwrap();
        let mut emma = dune(1);
        emma.title = "Emma".into();
        emma.author = "Jane Austen".into();
        lib.add_book(emma).unwrap();

        let found = lib.search_books("AUSTEN").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1.title, "Emma");
        assert!(lib.search_books("").unwrap().is_empty());
    }

    #[test]
    fn test_borrow_decrements_once() {
        let mut lib = library();
        let book = lib.add_book(dune(2)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();

        let loan = lib
            .borrow(user.as_str(), book.as_str(), date("2030-01-01"))
            .unwrap();
        assert_eq!(loan.due_date, date("2030-01-15"));
        assert_eq!(lib.book(book.as_str()).unwrap().available, 1);
    }

    #[test]
    fn test_borrow_last_copy_then_none_left() {
        let mut lib = library();
        let book = lib.add_book(dune(1)).unwrap();
        let ada = lib.register_user("Ada", date("2030-01-01")).unwrap();
        let alan = lib.register_user("Alan", date("2030-01-01")).unwrap();

        lib.borrow(ada.as_str(), book.as_str(), date("2030-01-01"))
            .unwrap();
        assert_eq!(lib.book(book.as_str()).unwrap().available, 0);

        assert!(matches!(
            lib.borrow(alan.as_str(), book.as_str(), date("2030-01-01")),
            Err(LibraryError::NoCopiesAvailable(_))
        ));
    }

    #[test]
    fn test_borrow_twice_rejected() {
        let mut lib = library();
        let book = lib.add_book(dune(3)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();

        lib.borrow(user.as_str(), book.as_str(), date("2030-01-01"))
            .unwrap();
        assert!(matches!(
            lib.borrow(user.as_str(), book.as_str(), date("2030-01-02")),
            Err(LibraryError::AlreadyBorrowed { .. })
        ));
        assert_eq!(lib.book(book.as_str()).unwrap().available, 2);
    }

    #[test]
    fn test_borrow_unknown_user_or_book() {
        let mut lib = library();
        let book = lib.add_book(dune(1)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();

        assert!(matches!(
            lib.borrow("USER0000", book.as_str(), date("2030-01-01")),
            Err(LibraryError::UserNotFound(_))
        ));
        assert!(matches!(
            lib.borrow(user.as_str(), "BOOK0000", date("2030-01-01")),
            Err(LibraryError::BookNotFound(_))
        ));
    }

    #[test]
    fn test_return_on_time() {
        let mut lib = library();
        let book = lib.add_book(dune(1)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();
        lib.borrow(user.as_str(), book.as_str(), date("2030-01-01"))
            .unwrap();

        let receipt = lib
            .return_book(user.as_str(), book.as_str(), date("2030-01-15"))
            .unwrap();
        assert_eq!(receipt.days_late, 0);
        assert_eq!(receipt.late_fee_cents, 0);
        assert_eq!(lib.book(book.as_str()).unwrap().available, 1);
        assert!(lib.loans_for(user.as_str()).unwrap().is_empty());
    }

    #[test]
    fn test_return_late_charges_fee() {
        let mut lib = library();
        let book = lib.add_book(dune(1)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();
        lib.borrow(user.as_str(), book.as_str(), date("2030-01-01"))
            .unwrap();

        let receipt = lib
            .return_book(user.as_str(), book.as_str(), date("2030-01-18"))
            .unwrap();
        assert_eq!(receipt.days_late, 3);
        assert_eq!(receipt.late_fee_cents, 300);
    }

    #[test]
    fn test_return_not_borrowed() {
        let mut lib = library();
        let book = lib.add_book(dune(1)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();
        assert!(matches!(
            lib.return_book(user.as_str(), book.as_str(), date("2030-01-01")),
            Err(LibraryError::NotBorrowed { .. })
        ));
    }

    #[test]
    fn test_remove_book_on_loan() {
        let mut lib = library();
        let book = lib.add_book(dune(1)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();
        lib.borrow(user.as_str(), book.as_str(), date("2030-01-01"))
            .unwrap();

        assert!(matches!(
            lib.remove_book(book.as_str()),
            Err(LibraryError::BookOnLoan(_))
        ));

        lib.return_book(user.as_str(), book.as_str(), date("2030-01-02"))
            .unwrap();
        lib.remove_book(book.as_str()).unwrap();
        assert!(matches!(
            lib.book(book.as_str()),
            Err(LibraryError::BookNotFound(_))
        ));
    }

    #[test]
    fn test_overdue_and_stock() {
        let mut lib = library();
        let book = lib.add_book(dune(2)).unwrap();
        let ada = lib.register_user("Ada", date("2030-01-01")).unwrap();
        let alan = lib.register_user("Alan", date("2030-01-01")).unwrap();
        lib.borrow(ada.as_str(), book.as_str(), date("2030-01-01"))
            .unwrap();
        lib.borrow(alan.as_str(), book.as_str(), date("2030-01-10"))
            .unwrap();

        let overdue = lib.overdue(date("2030-01-20")).unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].loan.user_id, ada.as_str());
        assert_eq!(overdue[0].days_overdue, 5);
        assert_eq!(overdue[0].late_fee_cents, 500);

        let report = lib.stock_report().unwrap();
        assert_eq!(report.titles, 1);
        assert_eq!(report.total_copies, 2);
        assert_eq!(report.borrowed_copies, 2);
        assert_eq!(report.available_copies, 0);
    }

    #[test]
    fn test_stock_report_sums_huge_counts() {
        let mut lib = library();
        lib.add_book(dune(i64::MAX)).unwrap();
        lib.add_book(dune(i64::MAX)).unwrap();

        let report = lib.stock_report().unwrap();
        assert_eq!(report.titles, 2);
        assert_eq!(report.total_copies, 2 * i128::from(i64::MAX));
        assert_eq!(report.available_copies, 2 * i128::from(i64::MAX));
        assert_eq!(report.borrowed_copies, 0);
    }

    #[test]
    fn test_user_activity() {
        let mut lib = library();
        lib.load_or_default("library.json").unwrap();
        let book = lib.add_book(dune(2)).unwrap();
        let emma = lib.add_book(dune(1)).unwrap();
        let ada = lib.register_user("Ada", date("2030-01-01")).unwrap();
        let alan = lib.register_user("Alan", date("2030-02-15")).unwrap();
        lib.borrow(ada.as_str(), book.as_str(), date("2030-03-01"))
            .unwrap();
        lib.borrow(ada.as_str(), emma.as_str(), date("2030-03-01"))
            .unwrap();

        let activity = lib.user_activity().unwrap();
        let rows: Vec<_> = activity
            .iter()
            .map(|a| (a.id.as_str(), a.user.join_date, a.active_loans))
            .collect();
        assert_eq!(
            rows,
            vec![
                (ada.as_str(), Some(date("2030-01-01")), 2),
                (alan.as_str(), Some(date("2030-02-15")), 0),
            ]
        );
        assert_eq!(lib.user(ADMIN_ID).unwrap().join_date, None);
    }

    #[test]
    fn test_load_or_default_creates_admin() {
        let mut lib = library();
        assert_eq!(lib.load_or_default("library.json").unwrap(), LoadOutcome::Missing);
        assert_eq!(lib.user(ADMIN_ID).unwrap().role, Role::Admin);
    }

    #[test]
    fn test_load_or_default_resets_corrupt_file() {
        let mut lib = library();
        lib.register_user("Ada", date("2030-01-01")).unwrap();
        lib.database().fs().put("library.json", "not json{");

        let outcome = lib.load_or_default("library.json").unwrap();
        assert!(matches!(outcome, LoadOutcome::Reset { .. }));
        let users = lib.users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].0.as_str(), ADMIN_ID);
    }

    #[test]
    fn test_load_corrupt_is_error() {
        let mut lib = library();
        lib.database().fs().put("library.json", "not json{");
        assert!(matches!(
            lib.load("library.json"),
            Err(LibraryError::Store(StoreError::Corruption { .. }))
        ));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut lib = library();
        let book = lib.add_book(dune(2)).unwrap();
        let user = lib.register_user("Ada", date("2030-01-01")).unwrap();
        lib.borrow(user.as_str(), book.as_str(), date("2030-01-01"))
            .unwrap();
        lib.save("library.json").unwrap();

        let fs = MemoryFileSystem::new();
        fs.put(
            "library.json",
            lib.database().fs().contents("library.json").unwrap(),
        );
        let mut restored = Library::with_fs(fs, LibraryConfig::default());
        assert_eq!(
            restored.load("library.json").unwrap(),
            LoadOutcome::Loaded(3)
        );
        assert_eq!(restored.book(book.as_str()).unwrap().available, 1);
        assert_eq!(restored.loans_for(user.as_str()).unwrap().len(), 1);

        restored
            .return_book(user.as_str(), book.as_str(), date("2030-01-02"))
            .unwrap();
        assert_eq!(restored.book(book.as_str()).unwrap().available, 2);
    }
}
