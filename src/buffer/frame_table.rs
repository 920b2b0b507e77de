//! (file, page number) → frame index map.
//!
//! Files are identified by filename: two handles opened on the same path
//! hash and compare equal here. A miss is an ordinary `None`, not an error;
//! the pool's public operations decide what a miss means.

use std::collections::HashMap;

use super::frame::FrameId;
use crate::storage::PageNumber;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FrameKey {
    filename: String,
    page_no: PageNumber,
}

/// Maps cached pages to the frames holding them.
pub(crate) struct FrameTable {
    map: HashMap<FrameKey, FrameId>,
}

impl FrameTable {
    /// Creates a table sized for a pool of `pool_size` frames.
    pub(crate) fn new(pool_size: usize) -> Self {
        // Sized a fifth over the frame count, like the frame array itself
        // the table never holds more than pool_size live entries.
        Self {
            map: HashMap::with_capacity(pool_size + pool_size / 5),
        }
    }

    pub(crate) fn insert(&mut self, filename: &str, page_no: PageNumber, frame_no: FrameId) {
        self.map.insert(
            FrameKey {
                filename: filename.to_owned(),
                page_no,
            },
            frame_no,
        );
    }

    pub(crate) fn lookup(&self, filename: &str, page_no: PageNumber) -> Option<FrameId> {
        self.map
            .get(&FrameKey {
                filename: filename.to_owned(),
                page_no,
            })
            .copied()
    }

    pub(crate) fn remove(&mut self, filename: &str, page_no: PageNumber) -> Option<FrameId> {
        self.map.remove(&FrameKey {
            filename: filename.to_owned(),
            page_no,
        })
    }

    /// Number of cached pages.
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}
