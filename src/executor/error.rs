//! Join execution errors.

use crate::buffer::BufferError;
use crate::storage::StorageError;

/// Errors that abort a join.
///
/// Unlike the heap access layer, the join operators do not swallow pool
/// errors; a failed buffer or storage operation ends the join.
#[derive(Debug)]
pub enum ExecutorError {
    Buffer(BufferError),
    Storage(StorageError),
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorError::Buffer(e) => write!(f, "buffer error: {}", e),
            ExecutorError::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecutorError::Buffer(e) => Some(e),
            ExecutorError::Storage(e) => Some(e),
        }
    }
}

impl From<BufferError> for ExecutorError {
    fn from(e: BufferError) -> Self {
        ExecutorError::Buffer(e)
    }
}

impl From<StorageError> for ExecutorError {
    fn from(e: StorageError) -> Self {
        ExecutorError::Storage(e)
    }
}
