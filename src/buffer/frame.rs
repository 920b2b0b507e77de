//! Frame descriptors for the buffer pool.
//!
//! A frame is one slot of the pool; it caches at most one page. The
//! descriptor carries the bookkeeping the clock sweep and the pin/unpin
//! lifecycle operate on, while the page bytes themselves live in the pool's
//! image array.

use std::sync::Weak;

use crate::storage::{HeapFile, PageNumber};

/// Index of a frame in the buffer pool, 0..pool_size.
///
/// `FrameId` is distinct from a page number: a page number identifies a
/// logical page on disk, a `FrameId` a physical slot in memory.
pub type FrameId = usize;

/// Per-frame metadata.
///
/// # Lifecycle
///
/// 1. **Empty**: `valid == false`, no file association
/// 2. **Seated**: a page was read or allocated into the frame, `pin_count == 1`
/// 3. **Pinned/unpinned**: `pin_count` moves up on hits and down on unpins
/// 4. **Evicted**: at `pin_count == 0` the clock sweep may write back a
///    dirty image and return the frame to **Empty**
pub(crate) struct FrameDesc {
    /// This frame's own index.
    pub(crate) frame_no: FrameId,

    /// Whether the frame currently caches a page.
    pub(crate) valid: bool,

    /// Owning file when valid. The pool does not own the file: the handle
    /// is held weakly and must outlive every page cached from it.
    pub(crate) file: Option<Weak<HeapFile>>,

    /// Cached page's number when valid.
    pub(crate) page_no: PageNumber,

    /// Number of clients currently using the page. Zero means evictable.
    pub(crate) pin_count: u32,

    /// Whether the cached image differs from the disk copy.
    pub(crate) dirty: bool,

    /// Second-chance bit for the clock sweep.
    pub(crate) ref_bit: bool,
}

impl FrameDesc {
    pub(crate) fn new(frame_no: FrameId) -> Self {
        Self {
            frame_no,
            valid: false,
            file: None,
            page_no: 0,
            pin_count: 0,
            dirty: false,
            ref_bit: false,
        }
    }

    /// Seats a freshly read or allocated page in this frame.
    ///
    /// The page starts pinned once, clean, and with its reference bit set,
    /// so a full clock pass must elapse before it becomes evictable.
    pub(crate) fn seat(&mut self, file: Weak<HeapFile>, page_no: PageNumber) {
        self.valid = true;
        self.file = Some(file);
        self.page_no = page_no;
        self.pin_count = 1;
        self.dirty = false;
        self.ref_bit = true;
    }

    /// Returns the frame to the empty state.
    pub(crate) fn clear(&mut self) {
        self.valid = false;
        self.file = None;
        self.page_no = 0;
        self.pin_count = 0;
        self.dirty = false;
        self.ref_bit = false;
    }
}
