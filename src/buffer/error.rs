//! Buffer pool errors.

use super::frame::FrameId;
use crate::storage::{PageNumber, StorageError};

/// Errors surfaced by the buffer pool.
#[derive(Debug)]
pub enum BufferError {
    /// The clock sweep completed a full pass with every frame pinned.
    BufferExceeded,

    /// `unpin_page` was called on a cached page whose pin count is already 0.
    PageNotPinned {
        filename: String,
        page_no: PageNumber,
        frame_no: FrameId,
    },

    /// `flush_file` found a matching frame that is still pinned.
    PagePinned {
        filename: String,
        page_no: PageNumber,
        frame_no: FrameId,
    },

    /// A frame with a file association but `valid == false` was encountered
    /// during a flush. Unreachable while the descriptor invariants hold;
    /// hitting it means the descriptor table is corrupted.
    BadBuffer {
        frame_no: FrameId,
        dirty: bool,
        valid: bool,
        ref_bit: bool,
    },

    /// Propagated error from the file layer.
    Storage(StorageError),
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::BufferExceeded => {
                write!(f, "buffer pool exhausted: all frames are pinned")
            }
            BufferError::PageNotPinned {
                filename,
                page_no,
                frame_no,
            } => write!(
                f,
                "page {} of {} (frame {}) is not pinned",
                page_no, filename, frame_no
            ),
            BufferError::PagePinned {
                filename,
                page_no,
                frame_no,
            } => write!(
                f,
                "page {} of {} (frame {}) is still pinned",
                page_no, filename, frame_no
            ),
            BufferError::BadBuffer {
                frame_no,
                dirty,
                valid,
                ref_bit,
            } => write!(
                f,
                "corrupted frame {} (dirty={}, valid={}, ref_bit={})",
                frame_no, dirty, valid, ref_bit
            ),
            BufferError::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BufferError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for BufferError {
    fn from(e: StorageError) -> Self {
        BufferError::Storage(e)
    }
}
