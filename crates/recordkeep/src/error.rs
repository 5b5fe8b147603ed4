//! Error types for the library collaborator.

use recordkeep_core::ValidationError;
use recordkeep_store::StoreError;
use thiserror::Error;

/// Errors that can occur during library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Storage error (including validation failures raised by the store).
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A stored record could not be read as the expected type.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Book not found.
    #[error("book not found: {0}")]
    BookNotFound(String),

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Every copy of the book is on loan.
    #[error("no copies of {0} available")]
    NoCopiesAvailable(String),

    /// The user already holds this book.
    #[error("user {user} has already borrowed {book}")]
    AlreadyBorrowed { user: String, book: String },

    /// The user does not hold this book.
    #[error("user {user} has not borrowed {book}")]
    NotBorrowed { user: String, book: String },

    /// The book cannot be removed while copies are out.
    #[error("book {0} is on loan")]
    BookOnLoan(String),
}

impl LibraryError {
    /// The validation failure behind this error, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            LibraryError::Store(StoreError::Validation(e)) => Some(e),
            _ => None,
        }
    }
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
