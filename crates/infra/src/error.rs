//! Storage and store error types.

use std::io;

use thiserror::Error;

use pharmstock_core::DomainError;

/// Why a persisted row could not be turned into an item.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("row is not valid UTF-8")]
    Encoding,

    #[error("invalid quantity '{value}': {reason}")]
    Quantity { value: String, reason: DomainError },

    #[error("invalid last_updated '{0}' (expected YYYY-MM-DD)")]
    Date(String),
}

/// A persisted row that was left out of the loaded inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the data file.
    pub line: u64,
    pub reason: RowError,
}

/// Failure reading or writing persisted inventory.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file cannot be opened, read, written or replaced.
    #[error("storage unavailable at {location}: {source}")]
    Unavailable {
        location: String,
        #[source]
        source: io::Error,
    },

    /// The header row is missing or not the expected six columns.
    #[error("malformed header in {location}: expected '{expected}', found '{found}'")]
    MalformedHeader {
        location: String,
        expected: String,
        found: String,
    },

    #[error("failed to encode inventory for {location}: {message}")]
    Encode { location: String, message: String },
}

impl StorageError {
    pub(crate) fn unavailable(location: impl Into<String>, source: io::Error) -> Self {
        Self::Unavailable {
            location: location.into(),
            source,
        }
    }
}

/// Error returned by inventory store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The change was applied in memory but could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The store service has stopped.
    #[error("inventory store is closed")]
    Closed,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_not_found())
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
