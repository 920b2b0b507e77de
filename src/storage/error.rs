//! Storage layer errors.

use crate::storage::page::{PageNumber, RecordId};

/// Errors raised by heap files and pages.
#[derive(Debug)]
pub enum StorageError {
    /// A file with this name already exists on disk.
    FileExists(String),

    /// No file with this name exists on disk.
    FileNotFound(String),

    /// The page number is out of range or refers to a deleted page.
    InvalidPage(PageNumber),

    /// The record id refers to a slot that is out of range or already deleted.
    InvalidRecord(RecordId),

    /// The record does not fit into the page's remaining free space.
    InsufficientSpace {
        /// Page that rejected the insert.
        page_number: PageNumber,
        /// Length of the record that did not fit.
        record_len: usize,
    },

    /// The on-disk file has an invalid format or size.
    Corrupted(String),

    /// I/O error from the underlying file system.
    Io(std::io::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::FileExists(name) => write!(f, "file already exists: {}", name),
            StorageError::FileNotFound(name) => write!(f, "file not found: {}", name),
            StorageError::InvalidPage(page_no) => write!(f, "invalid page: {}", page_no),
            StorageError::InvalidRecord(rid) => {
                write!(f, "invalid record: page {} slot {}", rid.page_number, rid.slot_number)
            }
            StorageError::InsufficientSpace {
                page_number,
                record_len,
            } => write!(
                f,
                "page {} has insufficient space for a {}-byte record",
                page_number, record_len
            ),
            StorageError::Corrupted(msg) => write!(f, "corrupted file: {}", msg),
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}
